//! Per-record line codec
//!
//! Each record kind maps to one pipe-delimited line:
//!
//! ```text
//! Account: <username>|<password>|<display name>|<role>
//! Hive:    <id>|<tag>|<color>|<location>|<status>|<honey>|<true|false>|<notes>
//! Task:    <id>|<name>|<description>|<location>|<status>|<notes>
//! ```
//!
//! Field values are written verbatim. A value containing the delimiter or a
//! line break produces a line that will not decode back to the same record;
//! see [`super::delimiter_hazards`].
//!
//! A hive's required actions are not part of its line; the file-level
//! reader and writer frame them in an `ACTIONS:<id>` block.

use apiary_core::{Account, Hive, RequiredActions, Role, Task, TaskStatus};
use chrono::{DateTime, Utc};

/// Field separator
pub const DELIMITER: char = '|';

/// Context shared by every decode in one load
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext {
    /// Stands in for the task timestamps the file does not store
    pub loaded_at: DateTime<Utc>,
}

impl DecodeContext {
    /// Context stamped with the current time
    pub fn now() -> Self {
        Self {
            loaded_at: Utc::now(),
        }
    }
}

/// A record that encodes to and decodes from a single delimited line
pub trait RecordCodec: Sized {
    /// Number of fields on the line
    const FIELD_COUNT: usize;

    /// Record kind, for diagnostics
    const KIND: &'static str;

    /// Encode the record as one line, without a line terminator
    fn encode_line(&self) -> String;

    /// Decode already-split fields; `fields.len() == FIELD_COUNT`
    fn decode_fields(fields: &[&str], ctx: &DecodeContext) -> Result<Self, String>;

    /// Split and decode a line
    ///
    /// Returns the reason the line was rejected on failure.
    fn decode_line(line: &str, ctx: &DecodeContext) -> Result<Self, String> {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != Self::FIELD_COUNT {
            return Err(format!(
                "{} line has {} fields, expected {}",
                Self::KIND,
                fields.len(),
                Self::FIELD_COUNT
            ));
        }
        Self::decode_fields(&fields, ctx)
    }
}

fn parse_int<T: std::str::FromStr>(field: &str, name: &str) -> Result<T, String> {
    field
        .trim()
        .parse::<T>()
        .map_err(|_| format!("{} '{}' is not a valid integer", name, field))
}

fn join(fields: &[&str]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(field);
    }
    line
}

impl RecordCodec for Account {
    const FIELD_COUNT: usize = 4;
    const KIND: &'static str = "account";

    fn encode_line(&self) -> String {
        join(&[
            &self.username,
            &self.password,
            &self.display_name,
            self.role.as_str(),
        ])
    }

    fn decode_fields(fields: &[&str], _ctx: &DecodeContext) -> Result<Self, String> {
        let role: Role = fields[3].parse()?;
        Ok(Account::new(fields[0], fields[1], fields[2], role))
    }
}

impl RecordCodec for Hive {
    const FIELD_COUNT: usize = 8;
    const KIND: &'static str = "hive";

    fn encode_line(&self) -> String {
        let id = self.id().to_string();
        let tag = self.tag_number().to_string();
        let honey = self.honey_level().to_string();
        let queen = if self.has_queen() { "true" } else { "false" };
        join(&[
            &id,
            &tag,
            self.tag_color(),
            self.location(),
            self.status(),
            &honey,
            queen,
            self.notes(),
        ])
    }

    fn decode_fields(fields: &[&str], _ctx: &DecodeContext) -> Result<Self, String> {
        let id: u32 = parse_int(fields[0], "hive id")?;
        let tag_number: u32 = parse_int(fields[1], "tag number")?;
        let honey_level: i32 = parse_int(fields[5], "honey level")?;
        // Anything but "true" reads as false
        let has_queen = fields[6].trim().eq_ignore_ascii_case("true");
        Ok(Hive::restore(
            id,
            tag_number,
            fields[2].to_string(),
            fields[3].to_string(),
            fields[4].to_string(),
            honey_level,
            has_queen,
            fields[7].to_string(),
            RequiredActions::new(),
        ))
    }
}

impl RecordCodec for Task {
    const FIELD_COUNT: usize = 6;
    const KIND: &'static str = "task";

    fn encode_line(&self) -> String {
        let id = self.id().to_string();
        join(&[
            &id,
            self.name(),
            self.description(),
            self.location(),
            self.status().as_str(),
            self.notes(),
        ])
    }

    fn decode_fields(fields: &[&str], ctx: &DecodeContext) -> Result<Self, String> {
        let id: u32 = parse_int(fields[0], "task id")?;
        let status: TaskStatus = fields[4].parse()?;
        Ok(Task::restore(
            id,
            fields[1].to_string(),
            fields[2].to_string(),
            fields[3].to_string(),
            status,
            fields[5].to_string(),
            ctx.loaded_at,
        ))
    }
}
