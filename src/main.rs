use std::io;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde_json::json;

use sentiment_ledger::config::Config;
use sentiment_ledger::results::{self, ResultsReport, NO_VOTES_MESSAGE};
use sentiment_ledger::seed::seed_sample_votes;
use sentiment_ledger::{JsonFileStore, LedgerError, VoteSubmission, VotingLedger};

struct AppState {
    ledger: VotingLedger<JsonFileStore>,
}

fn error_response(err: &LedgerError) -> HttpResponse {
    let body = json!({ "success": false, "message": err.to_string() });
    match err {
        LedgerError::DuplicateVoter(_) => HttpResponse::Conflict().json(body),
        LedgerError::StorageUnavailable { .. } => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn blocking_failed(err: impl std::fmt::Display) -> HttpResponse {
    error!("Ledger task failed: {}", err);
    HttpResponse::InternalServerError().json(json!({ "success": false, "message": "Internal error" }))
}

async fn handle_vote(data: Data<AppState>, vote: web::Json<VoteSubmission>) -> impl Responder {
    let vote = vote.into_inner();
    let state = data.clone();
    match web::block(move || state.ledger.submit(&vote)).await {
        Ok(Ok(receipt)) => {
            let tally = results::aggregate(data.ledger.parties(), &receipt.records);
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": receipt.message(),
                "weight": receipt.weight(),
                "summary": results::summarize(&tally),
            }))
        }
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

async fn get_results(data: Data<AppState>) -> impl Responder {
    let state = data.clone();
    match web::block(move || state.ledger.results()).await {
        Ok(Ok(ResultsReport::NoVotes)) => HttpResponse::Ok().json(json!({
            "success": false,
            "message": NO_VOTES_MESSAGE,
            "summary": "",
            "totals": [],
        })),
        Ok(Ok(ResultsReport::Tallied { summary, totals, votes })) => {
            let totals: Vec<_> = totals
                .iter()
                .map(|(party, total)| json!({ "party": party, "total": total }))
                .collect();
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Results updated.",
                "summary": summary,
                "totals": totals,
                "votes": votes,
            }))
        }
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

async fn verify_ledger(data: Data<AppState>) -> impl Responder {
    let state = data.clone();
    match web::block(move || state.ledger.audit()).await {
        Ok(Ok(audit)) => HttpResponse::Ok().json(json!({
            "valid": audit.is_valid(),
            "records": audit.records,
            "brokenAt": audit.broken_at.map(|b| b.index),
            "reason": audit.reason(),
        })),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

async fn get_history(data: Data<AppState>) -> impl Responder {
    let state = data.clone();
    match web::block(move || state.ledger.records()).await {
        Ok(Ok(records)) => {
            let history: Vec<_> = records
                .iter()
                .map(|record| {
                    json!({
                        "voterId": record.voter_id,
                        "party": record.party,
                        "weight": record.weight,
                        "timestamp": record.timestamp,
                        "hash": record.hash,
                    })
                })
                .collect();
            HttpResponse::Ok().json(history)
        }
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failed(err),
    }
}

async fn get_parties(data: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.ledger.parties())
}

fn to_io_error(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        to_io_error(e)
    })?;

    let store = JsonFileStore::open(&config.ledger_path).map_err(to_io_error)?;
    let ledger = VotingLedger::new(store, config.parties.clone());
    info!(
        "Ledger {} opened with {} parties",
        ledger.store().path().display(),
        ledger.parties().len()
    );

    if config.seed_sample_votes {
        seed_sample_votes(&ledger).map_err(to_io_error)?;
    }

    let state = Data::new(AppState { ledger });
    let (host, port) = config.bind_address();
    info!("Listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .route("/vote", web::post().to(handle_vote))
            .route("/results", web::get().to(get_results))
            .route("/verify", web::get().to(verify_ledger))
            .route("/history", web::get().to(get_history))
            .route("/parties", web::get().to(get_parties))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
