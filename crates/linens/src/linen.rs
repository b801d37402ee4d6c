use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use laundry_core::{
    Aggregate, DomainError, Entity, Event, LinenId, RecordId, normalize_notes,
    require_non_blank,
};

/// Kind of linen item, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinenType {
    Towel,
    Bedsheet,
    Other,
}

impl LinenType {
    /// Capitalized form used in reports.
    pub fn label(self) -> &'static str {
        match self {
            LinenType::Towel => "Towel",
            LinenType::Bedsheet => "Bedsheet",
            LinenType::Other => "Other",
        }
    }
}

impl FromStr for LinenType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "towel" => Ok(LinenType::Towel),
            "bedsheet" => Ok(LinenType::Bedsheet),
            "other" => Ok(LinenType::Other),
            other => Err(DomainError::validation(format!("unknown linen type '{other}'"))),
        }
    }
}

/// What happened to a batch of linen.
///
/// Stored flattened into [`LinenHistory`] as `"action": "new" | "dirty" | "thrown"`
/// next to `"count"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum LinenAction {
    /// New stock arrived: balance goes up.
    New { count: u32 },
    /// Sent to wash: balance unchanged.
    Dirty { count: u32 },
    /// Discarded: balance goes down.
    Thrown { count: u32 },
}

impl LinenAction {
    pub fn count(self) -> u32 {
        match self {
            LinenAction::New { count }
            | LinenAction::Dirty { count }
            | LinenAction::Thrown { count } => count,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinenAction::New { .. } => "new",
            LinenAction::Dirty { .. } => "dirty",
            LinenAction::Thrown { .. } => "thrown",
        }
    }

    /// Build an action from its stored name.
    pub fn from_name(name: &str, count: u32) -> Result<Self, DomainError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(LinenAction::New { count }),
            "dirty" => Ok(LinenAction::Dirty { count }),
            "thrown" => Ok(LinenAction::Thrown { count }),
            other => Err(DomainError::validation(format!("unknown linen action '{other}'"))),
        }
    }
}

/// How a `thrown` action is treated when it exceeds the current balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThrownPolicy {
    /// Accept it; the balance may go below zero.
    #[default]
    Permissive,
    /// Reject it as a validation error.
    #[serde(rename = "reject")]
    RejectOverdraw,
}

impl FromStr for ThrownPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(ThrownPolicy::Permissive),
            "reject" => Ok(ThrownPolicy::RejectOverdraw),
            other => Err(DomainError::validation(format!("unknown thrown policy '{other}'"))),
        }
    }
}

/// One recorded linen action (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinenHistory {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub action: LinenAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Aggregate root: Linen.
///
/// Invariant: `current_balance == opening_balance + sum(new) - sum(thrown)`,
/// and each lifetime counter equals the sum of its action's counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Linen {
    id: LinenId,
    name: String,
    #[serde(rename = "type")]
    linen_type: LinenType,
    opening_balance: u32,
    new_count: u64,
    dirty_count: u64,
    thrown_count: u64,
    current_balance: i64,
    history: Vec<LinenHistory>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip, default = "stored_linen_exists")]
    created: bool,
}

fn stored_linen_exists() -> bool {
    true
}

impl Linen {
    /// Create an empty, not-yet-created aggregate. Feed it a `CreateLinen`.
    pub fn empty(id: LinenId) -> Self {
        Self {
            id,
            name: String::new(),
            linen_type: LinenType::Other,
            opening_balance: 0,
            new_count: 0,
            dirty_count: 0,
            thrown_count: 0,
            current_balance: 0,
            history: Vec::new(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            created: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn linen_type(&self) -> LinenType {
        self.linen_type
    }

    pub fn opening_balance(&self) -> u32 {
        self.opening_balance
    }

    pub fn new_count(&self) -> u64 {
        self.new_count
    }

    pub fn dirty_count(&self) -> u64 {
        self.dirty_count
    }

    pub fn thrown_count(&self) -> u64 {
        self.thrown_count
    }

    pub fn current_balance(&self) -> i64 {
        self.current_balance
    }

    pub fn history(&self) -> &[LinenHistory] {
        &self.history
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

    /// History for display: newest event date first, ties keep insertion order.
    pub fn history_by_date_desc(&self) -> Vec<&LinenHistory> {
        let mut records: Vec<&LinenHistory> = self.history.iter().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }
}

impl Entity for Linen {
    type Id = LinenId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: CreateLinen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLinen {
    pub linen_id: LinenId,
    pub name: String,
    pub linen_type: LinenType,
    pub opening_balance: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditLinen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLinen {
    pub linen_id: LinenId,
    pub name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordAction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAction {
    pub linen_id: LinenId,
    pub record_id: RecordId,
    pub action: LinenAction,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub policy: ThrownPolicy,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinenCommand {
    Create(CreateLinen),
    Edit(EditLinen),
    RecordAction(RecordAction),
}

/// Event: LinenCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinenCreated {
    pub linen_id: LinenId,
    pub name: String,
    pub linen_type: LinenType,
    pub opening_balance: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LinenEdited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinenEdited {
    pub linen_id: LinenId,
    pub name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ActionRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecorded {
    pub linen_id: LinenId,
    pub record: LinenHistory,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinenEvent {
    Created(LinenCreated),
    Edited(LinenEdited),
    ActionRecorded(ActionRecorded),
}

impl Event for LinenEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LinenEvent::Created(_) => "linen.created",
            LinenEvent::Edited(_) => "linen.edited",
            LinenEvent::ActionRecorded(_) => "linen.action_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LinenEvent::Created(e) => e.occurred_at,
            LinenEvent::Edited(e) => e.occurred_at,
            LinenEvent::ActionRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Linen {
    type Command = LinenCommand;
    type Event = LinenEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LinenEvent::Created(e) => {
                self.id = e.linen_id.clone();
                self.name = e.name.clone();
                self.linen_type = e.linen_type;
                self.opening_balance = e.opening_balance;
                self.new_count = 0;
                self.dirty_count = 0;
                self.thrown_count = 0;
                self.current_balance = i64::from(e.opening_balance);
                self.history.clear();
                self.created_at = e.occurred_at;
                self.updated_at = e.occurred_at;
                self.created = true;
            }
            LinenEvent::Edited(e) => {
                if let Some(name) = &e.name {
                    self.name = name.clone();
                }
                self.updated_at = e.occurred_at;
            }
            LinenEvent::ActionRecorded(e) => {
                match e.record.action {
                    LinenAction::New { count } => {
                        self.new_count += u64::from(count);
                        self.current_balance += i64::from(count);
                    }
                    LinenAction::Dirty { count } => {
                        self.dirty_count += u64::from(count);
                    }
                    LinenAction::Thrown { count } => {
                        self.thrown_count += u64::from(count);
                        self.current_balance -= i64::from(count);
                    }
                }
                self.history.push(e.record.clone());
                self.updated_at = e.occurred_at;
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LinenCommand::Create(cmd) => self.handle_create(cmd),
            LinenCommand::Edit(cmd) => self.handle_edit(cmd),
            LinenCommand::RecordAction(cmd) => self.handle_record_action(cmd),
        }
    }
}

impl Linen {
    fn ensure_linen_id(&self, linen_id: &LinenId) -> Result<(), DomainError> {
        if &self.id != linen_id {
            return Err(DomainError::invariant("linen_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateLinen) -> Result<Vec<LinenEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("linen already exists"));
        }
        require_non_blank("name", &cmd.name)?;

        Ok(vec![LinenEvent::Created(LinenCreated {
            linen_id: cmd.linen_id.clone(),
            name: cmd.name.clone(),
            linen_type: cmd.linen_type,
            opening_balance: cmd.opening_balance,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditLinen) -> Result<Vec<LinenEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_linen_id(&cmd.linen_id)?;
        if let Some(name) = &cmd.name {
            require_non_blank("name", name)?;
        }

        Ok(vec![LinenEvent::Edited(LinenEdited {
            linen_id: cmd.linen_id.clone(),
            name: cmd.name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_action(&self, cmd: &RecordAction) -> Result<Vec<LinenEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_linen_id(&cmd.linen_id)?;

        let count = cmd.action.count();
        if count == 0 {
            return Err(DomainError::validation("count must be positive"));
        }
        if let (LinenAction::Thrown { .. }, ThrownPolicy::RejectOverdraw) = (cmd.action, cmd.policy)
        {
            if i64::from(count) > self.current_balance {
                return Err(DomainError::validation(format!(
                    "cannot throw away {count}, only {} in stock",
                    self.current_balance
                )));
            }
        }

        Ok(vec![LinenEvent::ActionRecorded(ActionRecorded {
            linen_id: cmd.linen_id.clone(),
            record: LinenHistory {
                id: cmd.record_id.clone(),
                date: cmd.date,
                action: cmd.action,
                notes: normalize_notes(cmd.notes.as_deref()),
            },
            occurred_at: cmd.occurred_at,
        })])
    }
}
