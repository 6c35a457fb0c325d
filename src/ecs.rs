//! Elastic Common Schema naming for [`JsonHandler`] output.
//!
//! The built-in keys are renamed so that log shippers can pick the fields up
//! without extra mapping:
//!
//! | built-in | emitted as    |
//! |----------|---------------|
//! | `time`   | `@timestamp`  |
//! | `msg`    | `message`     |
//! | `level`  | `log.level`   |
//! | `source` | `log.origin`  |
//!
//! `log.origin` is additionally reshaped into
//! `{"file":{"name":..,"line":..,"function":..}}`.

use crate::json::{HandlerOptions, JsonHandler, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY};
use crate::record::{Attr, Origin, Value};
use std::io::Write;
use tracing::Level;

pub const ECS_TIMESTAMP_KEY: &str = "@timestamp";
pub const ECS_MESSAGE_KEY: &str = "message";
pub const ECS_LEVEL_KEY: &str = "log.level";
pub const ECS_ORIGIN_KEY: &str = "log.origin";

/// Rewrite a single attribute to its ECS name.
///
/// Matching is by key alone, so a built-in name nested inside a group is
/// renamed as well.
pub fn rename_ecs(_groups: &[&str], attr: Attr) -> Attr {
    match attr.key.as_str() {
        TIME_KEY => Attr::new(ECS_TIMESTAMP_KEY, attr.value),
        MESSAGE_KEY => Attr::new(ECS_MESSAGE_KEY, attr.value),
        LEVEL_KEY => Attr::new(ECS_LEVEL_KEY, attr.value),
        SOURCE_KEY => {
            let value = match attr.value {
                Value::Source(source) => Value::Origin(Origin::from(&source)),
                other => other,
            };
            Attr::new(ECS_ORIGIN_KEY, value)
        }
        _ => attr,
    }
}

/// JSON handler bound to `writer` that emits ECS field names, includes the
/// call site on every record and drops anything below `INFO`.
pub fn ecs_handler<W: Write + Send>(writer: W) -> JsonHandler<W> {
    ecs_handler_with_level(writer, Level::INFO)
}

/// Same as [`ecs_handler`] with a caller-chosen minimum level.
pub fn ecs_handler_with_level<W: Write + Send>(writer: W, level: Level) -> JsonHandler<W> {
    let options = HandlerOptions::default()
        .with_level(level)
        .with_source(true)
        .with_replace_attr(rename_ecs);
    JsonHandler::new(writer, options)
}
