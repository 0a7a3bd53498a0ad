use crate::error::{FieldErrors, Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchasable admission tier belonging to exactly one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub quantity: u32,
    pub sold: u32,
    pub sale_starts_at: DateTime<Utc>,
    pub sale_ends_at: DateTime<Utc>,
    pub active: bool,
    pub benefits: Vec<String>,
    pub restrictions: Vec<String>,
}

impl TicketType {
    pub fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.sold)
    }
}

/// Arguments for creating a ticket type. `sold` always starts at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicketType {
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
    pub quantity: u32,
    pub sale_starts_at: DateTime<Utc>,
    pub sale_ends_at: DateTime<Utc>,
    pub benefits: Vec<String>,
    pub restrictions: Vec<String>,
}

impl NewTicketType {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        if self.price < 0.0 {
            errors.push("price", "must not be negative");
        }
        if self.quantity == 0 {
            errors.push("quantity", "must be greater than zero");
        }
        if self.sale_starts_at >= self.sale_ends_at {
            errors.push("sale_ends_at", "must be after sale_starts_at");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }
}

/// Typed partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketTypePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub sale_starts_at: Option<DateTime<Utc>>,
    pub sale_ends_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub benefits: Option<Vec<String>>,
    pub restrictions: Option<Vec<String>>,
}

impl TicketTypePatch {
    pub fn apply_to(&self, ticket: &mut TicketType) {
        if let Some(name) = &self.name {
            ticket.name = name.clone();
        }
        if let Some(description) = &self.description {
            ticket.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            ticket.price = price;
        }
        if let Some(quantity) = self.quantity {
            ticket.quantity = quantity;
        }
        if let Some(sale_starts_at) = self.sale_starts_at {
            ticket.sale_starts_at = sale_starts_at;
        }
        if let Some(sale_ends_at) = self.sale_ends_at {
            ticket.sale_ends_at = sale_ends_at;
        }
        if let Some(active) = self.active {
            ticket.active = active;
        }
        if let Some(benefits) = &self.benefits {
            ticket.benefits = benefits.clone();
        }
        if let Some(restrictions) = &self.restrictions {
            ticket.restrictions = restrictions.clone();
        }
    }

    /// Checks the invariants that only hold after the merge: the sale
    /// window stays ordered and quantity never drops below sold.
    pub fn validate_merged(ticket: &TicketType) -> Result<()> {
        let mut errors = FieldErrors::new();
        if ticket.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        if ticket.price < 0.0 {
            errors.push("price", "must not be negative");
        }
        if ticket.sale_starts_at >= ticket.sale_ends_at {
            errors.push("sale_ends_at", "must be after sale_starts_at");
        }
        if ticket.quantity < ticket.sold {
            errors.push("quantity", "must not drop below the quantity already sold");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }
}
