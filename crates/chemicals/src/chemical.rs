use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use laundry_core::{
    Aggregate, ChemicalId, DomainError, Entity, Event, RecordId, normalize_notes,
    require_non_blank,
};

/// Balance at or below which a chemical counts as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: Decimal = Decimal::ONE;

/// Unit pre-filled when adding a chemical.
pub const DEFAULT_UNIT: &str = "L";

/// One recorded consumption of a chemical (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: RecordId,
    /// When the chemical was used (chosen by the caller).
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Aggregate root: Chemical.
///
/// Invariant: `current_balance == opening_balance - sum(usage_history.amount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chemical {
    id: ChemicalId,
    name: String,
    opening_balance: Decimal,
    current_balance: Decimal,
    unit: String,
    usage_history: Vec<UsageRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip, default = "stored_chemical_exists")]
    created: bool,
}

fn stored_chemical_exists() -> bool {
    true
}

impl Chemical {
    /// Create an empty, not-yet-created aggregate. Feed it a `CreateChemical`.
    pub fn empty(id: ChemicalId) -> Self {
        Self {
            id,
            name: String::new(),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            unit: String::new(),
            usage_history: Vec::new(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            created: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance
    }

    pub fn current_balance(&self) -> Decimal {
        self.current_balance
    }

    /// Usage records in the order they were accepted.
    pub fn usage_history(&self) -> &[UsageRecord] {
        &self.usage_history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_low_stock(&self, threshold: Decimal) -> bool {
        self.current_balance <= threshold
    }

    pub fn total_used(&self) -> Decimal {
        self.usage_history.iter().map(|r| r.amount).sum()
    }

    /// Usage history for display: newest event date first, ties keep insertion order.
    pub fn usage_history_by_date_desc(&self) -> Vec<&UsageRecord> {
        let mut records: Vec<&UsageRecord> = self.usage_history.iter().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }
}

impl Entity for Chemical {
    type Id = ChemicalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: CreateChemical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChemical {
    pub chemical_id: ChemicalId,
    pub name: String,
    pub opening_balance: Decimal,
    pub unit: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditChemical. `None` leaves the field as it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditChemical {
    pub chemical_id: ChemicalId,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordUsage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUsage {
    pub chemical_id: ChemicalId,
    pub record_id: RecordId,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChemicalCommand {
    Create(CreateChemical),
    Edit(EditChemical),
    RecordUsage(RecordUsage),
}

/// Event: ChemicalCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalCreated {
    pub chemical_id: ChemicalId,
    pub name: String,
    pub opening_balance: Decimal,
    pub unit: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ChemicalEdited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalEdited {
    pub chemical_id: ChemicalId,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UsageRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecorded {
    pub chemical_id: ChemicalId,
    pub record: UsageRecord,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChemicalEvent {
    Created(ChemicalCreated),
    Edited(ChemicalEdited),
    UsageRecorded(UsageRecorded),
}

impl Event for ChemicalEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChemicalEvent::Created(_) => "chemical.created",
            ChemicalEvent::Edited(_) => "chemical.edited",
            ChemicalEvent::UsageRecorded(_) => "chemical.usage_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ChemicalEvent::Created(e) => e.occurred_at,
            ChemicalEvent::Edited(e) => e.occurred_at,
            ChemicalEvent::UsageRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Chemical {
    type Command = ChemicalCommand;
    type Event = ChemicalEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ChemicalEvent::Created(e) => {
                self.id = e.chemical_id.clone();
                self.name = e.name.clone();
                self.opening_balance = e.opening_balance;
                self.current_balance = e.opening_balance;
                self.unit = e.unit.clone();
                self.usage_history.clear();
                self.created_at = e.occurred_at;
                self.updated_at = e.occurred_at;
                self.created = true;
            }
            ChemicalEvent::Edited(e) => {
                if let Some(name) = &e.name {
                    self.name = name.clone();
                }
                if let Some(unit) = &e.unit {
                    self.unit = unit.clone();
                }
                self.updated_at = e.occurred_at;
            }
            ChemicalEvent::UsageRecorded(e) => {
                // Balance and history move together.
                self.current_balance -= e.record.amount;
                self.usage_history.push(e.record.clone());
                self.updated_at = e.occurred_at;
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ChemicalCommand::Create(cmd) => self.handle_create(cmd),
            ChemicalCommand::Edit(cmd) => self.handle_edit(cmd),
            ChemicalCommand::RecordUsage(cmd) => self.handle_record_usage(cmd),
        }
    }
}

impl Chemical {
    fn ensure_chemical_id(&self, chemical_id: &ChemicalId) -> Result<(), DomainError> {
        if &self.id != chemical_id {
            return Err(DomainError::invariant("chemical_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateChemical) -> Result<Vec<ChemicalEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("chemical already exists"));
        }
        require_non_blank("name", &cmd.name)?;
        require_non_blank("unit", &cmd.unit)?;
        if cmd.opening_balance < Decimal::ZERO {
            return Err(DomainError::validation("opening balance cannot be negative"));
        }

        Ok(vec![ChemicalEvent::Created(ChemicalCreated {
            chemical_id: cmd.chemical_id.clone(),
            name: cmd.name.clone(),
            opening_balance: cmd.opening_balance,
            unit: cmd.unit.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditChemical) -> Result<Vec<ChemicalEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_chemical_id(&cmd.chemical_id)?;
        if let Some(name) = &cmd.name {
            require_non_blank("name", name)?;
        }
        if let Some(unit) = &cmd.unit {
            require_non_blank("unit", unit)?;
        }

        Ok(vec![ChemicalEvent::Edited(ChemicalEdited {
            chemical_id: cmd.chemical_id.clone(),
            name: cmd.name.clone(),
            unit: cmd.unit.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_usage(&self, cmd: &RecordUsage) -> Result<Vec<ChemicalEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_chemical_id(&cmd.chemical_id)?;

        if cmd.amount <= Decimal::ZERO {
            return Err(DomainError::validation("usage amount must be positive"));
        }
        if cmd.amount > self.current_balance {
            return Err(DomainError::validation(format!(
                "usage amount {} exceeds current balance {}",
                cmd.amount, self.current_balance
            )));
        }

        Ok(vec![ChemicalEvent::UsageRecorded(UsageRecorded {
            chemical_id: cmd.chemical_id.clone(),
            record: UsageRecord {
                id: cmd.record_id.clone(),
                date: cmd.date,
                amount: cmd.amount,
                notes: normalize_notes(cmd.notes.as_deref()),
            },
            occurred_at: cmd.occurred_at,
        })])
    }
}
