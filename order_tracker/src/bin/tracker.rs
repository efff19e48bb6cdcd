use std::process;
use std::sync::Arc;

use error_stack::report;
use order_tracker::config::TrackerConfig;
use order_tracker::error::{Error, ReportDisplayExt, TrackerResult};
use order_tracker::orderbook::Initiator;
use order_tracker::orderbook::client::OrderbookClient;
use order_tracker::orderbook::initiator::HttpInitiator;
use order_tracker::orderbook::quote::{QuoteClient, QuoteCommand};
use order_tracker::polling::manager::OrderPoller;
use order_tracker::presenter::{InitiateOutcome, OrderBoard};
use order_tracker::utils::number_conversion::format_units;
use orderbook_models::log::init_tracing;
use orderbook_models::models::asset::AssetRegistry;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("tracker error: {}", err.format());
        process::exit(1);
    }
}

async fn run() -> TrackerResult<()> {
    dotenv::dotenv().ok();
    init_tracing(false);

    let config = TrackerConfig::from_env()?;
    let http = config.http_client()?;

    let source = Arc::new(OrderbookClient::new(
        http.clone(),
        config.orderbook_url.clone(),
        config.data_url.clone(),
    ));
    let quotes = QuoteClient::new(http.clone(), config.quote_url.clone());
    let initiator: Option<Arc<dyn Initiator>> = config
        .initiate_url
        .clone()
        .map(|url| Arc::new(HttpInitiator::new(http.clone(), url)) as Arc<dyn Initiator>);

    let (poller, poller_handle) = OrderPoller::spawn(source, config.poller.clone());
    let mut snapshots = poller.subscribe();
    let registry = AssetRegistry::for_network(config.poller.network);
    let mut board = OrderBoard::new(registry.clone());
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<InitiateOutcome>(16);

    println!("Order tracker ready ({} network).", config.poller.network);
    println!("Commands:");
    println!("  orders");
    println!("  details <order_id>");
    println!("  initiate <order_id>");
    println!("  quote <chain:asset> <chain:asset> <amount> <decimals>");
    println!("  refresh");
    println!("  quit");

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    eprintln!("Poller stopped");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                board.apply_snapshot(&snapshot);
            }
            Some(outcome) = outcome_rx.recv() => {
                board.finish_initiate(&outcome);
                match &outcome.result {
                    Ok(()) => println!("Initiate submitted for {}", outcome.order_id),
                    Err(e) => eprintln!("Initiate failed for {}: {}", outcome.order_id, e.format()),
                }
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut parts = line.split_whitespace();
                let cmd = parts.next().unwrap_or_default();

                match cmd {
                    "quit" | "exit" => {
                        println!("Exiting…");
                        break;
                    }

                    "orders" => {
                        board.apply_snapshot(&poller.latest());
                        println!("{}", board.render());
                    }

                    "details" => {
                        let Some(order_id) = parts.next() else {
                            eprintln!("Usage: details <order_id>");
                            continue;
                        };
                        match board.details(order_id) {
                            Ok(details) => println!("{details}"),
                            Err(e) => eprintln!("{}", e.format()),
                        }
                    }

                    "initiate" => {
                        let Some(order_id) = parts.next() else {
                            eprintln!("Usage: initiate <order_id>");
                            continue;
                        };
                        let Some(initiator) = &initiator else {
                            eprintln!("INITIATE_URL is not set");
                            continue;
                        };
                        match board.spawn_initiate(order_id, initiator.clone(), outcome_tx.clone()) {
                            Ok(_) => println!("Initiating {order_id}..."),
                            Err(e) => eprintln!("{}", e.format()),
                        }
                    }

                    "quote" => {
                        let args: Vec<&str> = parts.collect();
                        match quote(&quotes, &registry, &args).await {
                            Ok(output) => println!("{output}"),
                            Err(e) => eprintln!("{}", e.format()),
                        }
                    }

                    "refresh" => match poller.refresh().await {
                        Ok(snapshot) => {
                            board.apply_snapshot(&snapshot);
                            println!("{}", board.render());
                        }
                        Err(e) => eprintln!("{}", e.format()),
                    },

                    other => {
                        eprintln!("Unknown command '{other}'");
                    }
                }
            }
        }
    }

    if let Err(e) = poller.shutdown().await {
        tracing::warn!("Poller shutdown failed: {}", e.format());
    }
    match poller_handle.await {
        Ok(result) => result,
        Err(e) => Err(report!(Error::ModuleStopped("OrderPoller".to_string()))
            .attach_printable(format!("Poller task failed: {e}"))),
    }
}

async fn quote(
    quotes: &QuoteClient,
    registry: &AssetRegistry,
    args: &[&str],
) -> TrackerResult<String> {
    let command = QuoteCommand::parse(args)?;
    let preview = command.receive_preview(registry);

    let quote = quotes.get_quote(&command.request).await?;
    let (strategy, receive) = quote.best()?;
    let receive = format_units(receive, command.receive_decimals(registry))
        .unwrap_or_else(|_| format!("{receive} base units"));
    Ok(format!(
        "{}: receive {receive} via {strategy} (preview {preview})",
        command.request.order_pair()
    ))
}
