use crate::error::HandleError;
use crate::handler::Handler;
use crate::record::{Attr, Attrs, Record, Value};
use opentelemetry::Context;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Level;

/// Key of the built-in timestamp attribute.
pub const TIME_KEY: &str = "time";
/// Key of the built-in severity attribute.
pub const LEVEL_KEY: &str = "level";
/// Key of the built-in message attribute.
pub const MESSAGE_KEY: &str = "msg";
/// Key of the built-in call-site attribute.
pub const SOURCE_KEY: &str = "source";

/// Per-attribute rewrite hook.
///
/// Receives the names of the enclosing groups (empty at the top level) and
/// the attribute, and returns the attribute to encode. Returning an
/// attribute with an empty key drops it.
pub type ReplaceAttr = Arc<dyn Fn(&[&str], Attr) -> Attr + Send + Sync>;

/// Options for [`JsonHandler`].
///
/// **Fields**
/// - `level`: minimum severity that is emitted. Defaults to `INFO`.
/// - `add_source`: include the record's [`Source`](crate::record::Source)
///   under [`SOURCE_KEY`].
/// - `replace_attr`: optional rewrite applied to every non-group attribute,
///   built-ins included.
#[derive(Clone)]
pub struct HandlerOptions {
    pub level: Level,
    pub add_source: bool,
    pub replace_attr: Option<ReplaceAttr>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            add_source: false,
            replace_attr: None,
        }
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("level", &self.level)
            .field("add_source", &self.add_source)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

impl HandlerOptions {
    /// Set the minimum severity that is emitted.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Include the record's call site under [`SOURCE_KEY`].
    pub fn with_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    /// Install the per-attribute rewrite; see [`ReplaceAttr`].
    pub fn with_replace_attr<F>(mut self, replace: F) -> Self
    where
        F: Fn(&[&str], Attr) -> Attr + Send + Sync + 'static,
    {
        self.replace_attr = Some(Arc::new(replace));
        self
    }
}

/// [`Handler`] that writes each record as one line of JSON.
///
/// The line is fully encoded before the writer lock is taken and is then
/// written with a single `write_all`, so concurrent callers never
/// interleave output.
pub struct JsonHandler<W> {
    writer: Mutex<W>,
    options: HandlerOptions,
}

impl<W: Write + Send> JsonHandler<W> {
    pub fn new(writer: W, options: HandlerOptions) -> Self {
        Self {
            writer: Mutex::new(writer),
            options,
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    fn encode(&self, record: Record) -> Result<Vec<u8>, HandleError> {
        let mut builtins = vec![
            Attr::new(TIME_KEY, Value::Time(record.timestamp)),
            Attr::new(LEVEL_KEY, Value::Level(record.level)),
        ];
        if self.options.add_source {
            if let Some(source) = record.source {
                builtins.push(Attr::new(SOURCE_KEY, Value::Source(source)));
            }
        }
        builtins.push(Attr::new(MESSAGE_KEY, Value::Str(record.message)));

        let mut groups = Vec::new();
        let mut attrs = Vec::new();
        for a in builtins.into_iter().chain(record.attrs) {
            self.resolve(&mut groups, a, &mut attrs);
        }

        let mut buf = serde_json::to_vec(&Attrs(&attrs))?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Run `replace_attr` over `attr`, descending into groups, and push the
    /// result onto `out`.
    ///
    /// Empty groups and attributes rewritten to an empty key are dropped. A
    /// group with an empty key has its members inlined into `out` and adds
    /// nothing to the group path.
    fn resolve(&self, groups: &mut Vec<String>, attr: Attr, out: &mut Vec<Attr>) {
        match attr.value {
            Value::Group(members) if attr.key.is_empty() => {
                for m in members {
                    self.resolve(groups, m, out);
                }
            }
            Value::Group(members) => {
                groups.push(attr.key.clone());
                let mut resolved = Vec::with_capacity(members.len());
                for m in members {
                    self.resolve(groups, m, &mut resolved);
                }
                groups.pop();
                if !resolved.is_empty() {
                    out.push(Attr {
                        key: attr.key,
                        value: Value::Group(resolved),
                    });
                }
            }
            value => {
                let attr = Attr {
                    key: attr.key,
                    value,
                };
                let attr = match &self.options.replace_attr {
                    Some(replace) => {
                        let path: Vec<&str> = groups.iter().map(String::as_str).collect();
                        replace(&path, attr)
                    }
                    None => attr,
                };
                if !attr.key.is_empty() {
                    out.push(attr);
                }
            }
        }
    }
}

impl<W: Write + Send> Handler for JsonHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        // `tracing` orders more verbose levels as greater.
        level <= self.options.level
    }

    fn handle(&self, _cx: Option<&Context>, record: Record) -> Result<(), HandleError> {
        let line = self.encode(record)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}
