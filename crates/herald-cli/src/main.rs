mod customer;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use herald_core::ports::FnHandler;
use herald_core::typed::DomainEvent;
use herald_core::{DispatcherBuilder, Event, EventDispatcher, EventType, HandlerError};
use tracing_subscriber::EnvFilter;

use crate::customer::{
    CustomerAddressChanged, CustomerCreated, LogAddressChange, LogCustomerCreated,
};

#[derive(Parser)]
#[command(name = "herald")]
#[command(version, about = "Notify customer events through an in-process dispatcher", long_about = None)]
struct Cli {
    /// Run every handler even if one fails, then report all failures
    #[arg(long, global = true)]
    isolate: bool,

    /// Register an extra handler that always fails, before the console handlers
    #[arg(long, global = true)]
    with_failing_handler: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "herald_core=trace")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Notify a CustomerCreated event
    CustomerCreated {
        #[arg(long)]
        name: String,
    },
    /// Notify a CustomerAddressChanged event
    AddressChanged {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Wire the console handlers for both customer events.
fn build_dispatcher(with_failing_handler: bool) -> anyhow::Result<EventDispatcher> {
    let mut builder = DispatcherBuilder::new();
    if with_failing_handler {
        let failing = Arc::new(FnHandler::new("always-fails", |event: &Event| {
            Err(HandlerError::new(format!(
                "refusing {} ({})",
                event.event_type(),
                event.id()
            )))
        }));
        for ty in [CustomerCreated::TYPE, CustomerAddressChanged::TYPE] {
            builder = builder.register(EventType::new(ty)?, failing.clone());
        }
    }

    let dispatcher = builder
        .subscribe::<CustomerCreated, _>(LogCustomerCreated::first())?
        .subscribe::<CustomerCreated, _>(LogCustomerCreated::second())?
        .subscribe::<CustomerAddressChanged, _>(LogAddressChange)?
        .expect_event_types(&[CustomerCreated::TYPE, CustomerAddressChanged::TYPE])
        .build()?;
    Ok(dispatcher)
}

fn event_for(command: Commands) -> anyhow::Result<Event> {
    let event = match command {
        Commands::CustomerCreated { name } => Event::from_domain(&CustomerCreated { name })?,
        Commands::AddressChanged { id, name, address } => {
            Event::from_domain(&CustomerAddressChanged { id, name, address })?
        }
    };
    Ok(event)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let dispatcher = build_dispatcher(cli.with_failing_handler)?;
    let event = event_for(cli.command)?;
    tracing::info!(
        event_type = %event.event_type(),
        event_id = %event.id(),
        isolate = cli.isolate,
        "dispatching"
    );

    if cli.isolate {
        if let Err(failures) = dispatcher.notify_isolated(&event) {
            for failure in &failures.failures {
                eprintln!("{failure}");
            }
            return Err(failures.into());
        }
    } else {
        dispatcher
            .notify(&event)
            .with_context(|| format!("notify {}", event.event_type()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dispatcher_wires_both_customer_events() {
        let d = build_dispatcher(false).unwrap();
        assert_eq!(d.handler_count(CustomerCreated::TYPE), 2);
        assert_eq!(d.handler_count(CustomerAddressChanged::TYPE), 1);
    }

    #[test]
    fn failing_handler_runs_first_and_stops_notify() {
        let d = build_dispatcher(true).unwrap();
        assert_eq!(d.handler_count(CustomerCreated::TYPE), 3);

        let event = event_for(Commands::CustomerCreated {
            name: "any_name".to_string(),
        })
        .unwrap();
        let err = d.notify(&event).unwrap_err();
        assert!(err.message().starts_with("refusing CustomerCreated"));

        let failures = d.notify_isolated(&event).unwrap_err();
        assert_eq!(failures.handlers().collect::<Vec<_>>(), vec!["always-fails"]);
    }

    #[test]
    fn subcommands_notify_under_their_event_type() {
        let d = build_dispatcher(false).unwrap();
        let created = event_for(Commands::CustomerCreated {
            name: "any_name".to_string(),
        })
        .unwrap();
        let changed = event_for(Commands::AddressChanged {
            id: 1,
            name: "John Doe".to_string(),
            address: "any_address, 123".to_string(),
        })
        .unwrap();

        assert_eq!(created.event_type().as_str(), CustomerCreated::TYPE);
        assert_eq!(changed.event_type().as_str(), CustomerAddressChanged::TYPE);
        d.notify(&created).unwrap();
        d.notify(&changed).unwrap();
    }

    #[test]
    fn parses_address_changed() {
        let cli = Cli::try_parse_from([
            "herald",
            "--isolate",
            "address-changed",
            "--id",
            "1",
            "--name",
            "John Doe",
            "--address",
            "any_address, 123",
        ])
        .unwrap();
        assert!(cli.isolate);

        let event = event_for(cli.command).unwrap();
        assert_eq!(event.event_type().as_str(), "CustomerAddressChanged");
        assert_eq!(
            event.data(),
            &serde_json::json!({ "id": 1, "name": "John Doe", "address": "any_address, 123" })
        );
    }
}
