//! Interactive demo for the TicketHub client.
//!
//! Walks the whole flow against a configured remote store: restore or
//! create a session, list events, stage the first one, book the first
//! available seat, and show the wallet.
//!
//! ```text
//! tickethub <username> <password>
//! ```

use std::time::Duration;

use anyhow::{Context, bail};
use tickethub_client::{AppEnvironment, BookingOutcome, Config, TicketHubClient, View};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickethub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing .env is fine; environment variables still apply.
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    info!(api = %config.api_url, ws = %config.ws_url, "Configuration loaded");

    let env = AppEnvironment::production(&config);
    let client = TicketHubClient::new(&config, env);

    if client.restore_session().await? {
        let session = client.session().await;
        println!(
            "Resumed session for {}",
            session.map_or_else(|| "<unknown>".to_string(), |s| s.username)
        );
    } else {
        let mut args = std::env::args().skip(1);
        let (Some(username), Some(password)) = (args.next(), args.next()) else {
            bail!("no persisted session; usage: tickethub <username> <password>");
        };

        match client.login(&username, &password).await {
            Ok(session) => println!("Logged in as {}", session.username),
            Err(error) => {
                println!("Login failed ({error}); trying to register...");
                client
                    .register(&username, &password)
                    .await
                    .context("registration failed")?;
                let session = client.login(&username, &password).await?;
                println!("Registered and logged in as {}", session.username);
            },
        }
    }

    // The event list fetch was kicked off by the login transition; give the
    // feedback loop a moment before reading the snapshot.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let events = client.events().await;
    println!("\nUpcoming events: {}", events.len());
    for event in &events {
        println!("  [{}] {} @ {} ({})", event.id, event.name, event.venue, event.date);
    }

    let Some(event) = events.first().cloned() else {
        println!("No events found; nothing to book.");
        client.shutdown(Duration::from_secs(5)).await?;
        return Ok(());
    };

    println!("\nEntering stage for '{}'...", event.name);
    client.select_event(event).await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let seats = client.seats().await;
    println!("Seat map ({} seats):", seats.len());
    for seat in &seats {
        let marker = if seat.sold { "x" } else { " " };
        print!(" [{marker}]{}", seat.seat_number);
    }
    println!();

    if let Some(seat) = seats.iter().find(|s| !s.sold) {
        println!("\nBooking {}...", seat.seat_number);
        match client.book_seat(&seat.seat_number).await? {
            BookingOutcome::Success => println!("Booked {}!", seat.seat_number),
            BookingOutcome::Rejected { reason } => println!("Refused: {reason}"),
            BookingOutcome::TransportError { detail } => println!("No verdict: {detail}"),
        }
    } else {
        println!("\nEverything is sold out.");
    }

    client.navigate(View::Wallet).await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let tickets = client.tickets().await;
    println!("\nMy wallet ({} tickets):", tickets.len());
    for ticket in &tickets {
        let event_name = ticket
            .event
            .as_ref()
            .map_or("<event unavailable>", |e| e.name.as_str());
        println!("  Seat {} - {} [CONFIRMED]", ticket.seat_number, event_name);
    }

    client.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
