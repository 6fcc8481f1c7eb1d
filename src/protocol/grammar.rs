// src/protocol/grammar.rs
//
// Declarative command grammar and validator.
//
// A command is classified by the FIRST production whose keyword appears
// anywhere in the (trimmed) input, in table order. Only then is the input
// checked against that production's shape. Inputs that contain more than one
// keyword are therefore classified by table position, e.g. "$freq, menu;"
// is judged as a (malformed) menu command.

use super::command::{Attitude, Axis, Command, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
use super::error::RejectionReason;

// ============================================================================
// Grammar Table
// ============================================================================

/// Kind of a single comma-separated argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Unsigned decimal digits, range-checked against the frequency bounds
    Frequency,
    /// One of the axis keywords
    Axis,
    /// Optional leading '-', then decimal digits, fits in i32
    Signed(&'static str),
}

/// Parsed argument value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Frequency(u8),
    Axis(Axis),
    Signed(i32),
}

/// Shape of a production
#[derive(Debug, Clone, Copy)]
pub enum Form {
    /// `$<keyword>;` and nothing else
    Bare(Command),
    /// `$<keyword>, <arg>, ...;`
    Args {
        fields: &'static [Field],
        build: fn(&[Value]) -> Option<Command>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Production {
    pub keyword: &'static str,
    pub form: Form,
}

const ATTITUDE_FIELDS: &[Field] = &[Field::Signed("roll"), Field::Signed("pitch"), Field::Signed("yaw")];

/// Productions in classification priority order
pub const GRAMMAR: &[Production] = &[
    Production { keyword: "menu", form: Form::Bare(Command::Menu) },
    Production { keyword: "stream", form: Form::Bare(Command::StreamToggle) },
    Production { keyword: "exit", form: Form::Bare(Command::Exit) },
    Production {
        keyword: "freq",
        form: Form::Args { fields: &[Field::Frequency], build: build_frequency },
    },
    Production {
        keyword: "axis",
        form: Form::Args { fields: &[Field::Axis], build: build_axis },
    },
    Production {
        keyword: "ref",
        form: Form::Args { fields: ATTITUDE_FIELDS, build: build_reference },
    },
    Production {
        keyword: "sig",
        form: Form::Args { fields: ATTITUDE_FIELDS, build: build_signal },
    },
];

fn build_frequency(values: &[Value]) -> Option<Command> {
    match values {
        [Value::Frequency(hz)] => Some(Command::SetFrequency { hz: *hz }),
        _ => None,
    }
}

fn build_axis(values: &[Value]) -> Option<Command> {
    match values {
        [Value::Axis(axis)] => Some(Command::SetAxis { axis: *axis }),
        _ => None,
    }
}

fn attitude(values: &[Value]) -> Option<Attitude> {
    match values {
        [Value::Signed(roll), Value::Signed(pitch), Value::Signed(yaw)] => {
            Some(Attitude::new(*roll, *pitch, *yaw))
        }
        _ => None,
    }
}

fn build_reference(values: &[Value]) -> Option<Command> {
    attitude(values).map(Command::SetReference)
}

fn build_signal(values: &[Value]) -> Option<Command> {
    attitude(values).map(Command::SetSignal)
}

// ============================================================================
// Validation
// ============================================================================

/// Classify an input by keyword containment (first match in table order wins).
/// Performs no shape checks.
pub fn classify(text: &str) -> Option<&'static Production> {
    GRAMMAR.iter().find(|p| text.contains(p.keyword))
}

/// Validate operator-entered text into a [`Command`].
///
/// Pure and deterministic. Malformed input is reported as a
/// [`RejectionReason`], never as a panic.
pub fn validate(text: &str) -> Result<Command, RejectionReason> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RejectionReason::Blank);
    }
    if text.chars().count() < 2 {
        return Err(RejectionReason::TooShort);
    }
    if !text.starts_with('$') {
        return Err(RejectionReason::MissingPrefix);
    }
    if !text.ends_with(';') {
        return Err(RejectionReason::MissingTerminator);
    }

    let production = classify(text).ok_or(RejectionReason::UnknownCommand)?;
    // '$' and ';' are single-byte, so this slice is on char boundaries
    let body = &text[1..text.len() - 1];

    match production.form {
        Form::Bare(command) => {
            if body == production.keyword {
                Ok(command)
            } else if body.starts_with(production.keyword) && body.contains(',') {
                Err(RejectionReason::UnexpectedArguments {
                    keyword: production.keyword,
                })
            } else {
                Err(RejectionReason::Malformed {
                    keyword: production.keyword,
                })
            }
        }
        Form::Args { fields, build } => {
            let mut parts = body.split(',');
            if parts.next() != Some(production.keyword) {
                return Err(RejectionReason::Malformed {
                    keyword: production.keyword,
                });
            }

            let args: Vec<&str> = parts.map(str::trim).collect();
            if args.len() != fields.len() {
                return Err(RejectionReason::WrongArity {
                    keyword: production.keyword,
                    expected: fields.len(),
                    found: args.len(),
                });
            }

            let values = fields
                .iter()
                .zip(&args)
                .map(|(field, raw)| parse_field(*field, raw))
                .collect::<Result<Vec<_>, _>>()?;

            build(&values).ok_or(RejectionReason::Malformed {
                keyword: production.keyword,
            })
        }
    }
}

fn parse_field(field: Field, raw: &str) -> Result<Value, RejectionReason> {
    match field {
        Field::Frequency => {
            if !is_digits(raw) {
                return Err(RejectionReason::InvalidNumber {
                    field: "frequency",
                    value: raw.to_string(),
                });
            }
            let value: u64 = raw.parse().map_err(|_| RejectionReason::InvalidNumber {
                field: "frequency",
                value: raw.to_string(),
            })?;
            if value < MIN_FREQUENCY_HZ as u64 || value > MAX_FREQUENCY_HZ as u64 {
                return Err(RejectionReason::OutOfRange {
                    field: "frequency",
                    value,
                    min: MIN_FREQUENCY_HZ as u64,
                    max: MAX_FREQUENCY_HZ as u64,
                });
            }
            Ok(Value::Frequency(value as u8))
        }
        Field::Axis => Axis::from_keyword(raw)
            .map(Value::Axis)
            .ok_or_else(|| RejectionReason::UnknownAxis(raw.to_string())),
        Field::Signed(name) => {
            let digits = raw.strip_prefix('-').unwrap_or(raw);
            if !is_digits(digits) {
                return Err(RejectionReason::InvalidNumber {
                    field: name,
                    value: raw.to_string(),
                });
            }
            raw.parse::<i32>()
                .map(Value::Signed)
                .map_err(|_| RejectionReason::InvalidNumber {
                    field: name,
                    value: raw.to_string(),
                })
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Tests
// ============================================================================
