//! Customer events and the console handlers that react to them.

use herald_core::HandlerError;
use herald_core::typed::{DomainEvent, Handler};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreated {
    pub name: String,
}

impl DomainEvent for CustomerCreated {
    const TYPE: &'static str = "CustomerCreated";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAddressChanged {
    pub id: u64,
    pub name: String,
    pub address: String,
}

impl DomainEvent for CustomerAddressChanged {
    const TYPE: &'static str = "CustomerAddressChanged";
}

/// Prints one line per `CustomerCreated`, tagged with its position.
pub struct LogCustomerCreated {
    ordinal: &'static str,
}

impl LogCustomerCreated {
    pub fn first() -> Self {
        Self { ordinal: "first" }
    }

    pub fn second() -> Self {
        Self { ordinal: "second" }
    }

    fn line(&self, event: &CustomerCreated) -> String {
        format!(
            "This is the {} console.log of event: {} ({})",
            self.ordinal,
            CustomerCreated::TYPE,
            event.name
        )
    }
}

impl Handler<CustomerCreated> for LogCustomerCreated {
    fn handle(&self, event: CustomerCreated) -> Result<(), HandlerError> {
        println!("{}", self.line(&event));
        Ok(())
    }
}

pub struct LogAddressChange;

impl LogAddressChange {
    fn line(event: &CustomerAddressChanged) -> String {
        format!(
            "Customer address: {}, {} changed to: {}",
            event.id, event.name, event.address
        )
    }
}

impl Handler<CustomerAddressChanged> for LogAddressChange {
    fn handle(&self, event: CustomerAddressChanged) -> Result<(), HandlerError> {
        println!("{}", Self::line(&event));
        Ok(())
    }
}
