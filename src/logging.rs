use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Compact formatter: `LEVEL module::function [spans]: message key=value`.
///
/// The function name comes from the `function` field the `log_*!` macros
/// attach; plain `tracing` events fall back to the module path alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallsiteFormatter;

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    function: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl FieldCollector {
    fn store(&mut self, name: &'static str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "function" => self.function = Some(value),
            _ => self.fields.push((name, value)),
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let raw = format!("{value:?}");
        let cleaned = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            raw[1..raw.len() - 1].to_string()
        } else {
            raw
        };
        self.store(field.name(), cleaned);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field.name(), value.to_string());
    }
}

impl<S, N> FormatEvent<S, N> for CallsiteFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        match collector.function {
            Some(function) => write!(writer, "{} {function}", metadata.level())?,
            None => {
                let module = metadata.module_path().unwrap_or_else(|| metadata.target());
                write!(writer, "{} {module}", metadata.level())?
            }
        }

        if let Some(scope) = ctx.event_scope() {
            let names: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !names.is_empty() {
                write!(writer, " [{}]", names.join("::"))?;
            }
        }

        write!(writer, ":")?;
        if let Some(message) = collector.message {
            write!(writer, " {message}")?;
        }
        for (name, value) in collector.fields {
            write!(writer, " {name}={value}")?;
        }
        writeln!(writer)
    }
}

/// Installs the global subscriber, writing to stderr so reports on stdout
/// stay machine readable.
///
/// `RUST_LOG` wins over `default_filter`; an unparsable filter falls back to
/// `info`. Installing twice is an error.
pub fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(CallsiteFormatter)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}



#[macro_export]
#[doc(hidden)]
macro_rules! __log_function_path {
    () => {{
        fn __type_name_of<T>(_value: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = __type_name_of(|| {});
        match name.find("::{{closure") {
            Some(index) => &name[..index],
            None => name,
        }
    }};
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        tracing::trace!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        tracing::debug!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        tracing::info!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        tracing::warn!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        tracing::error!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}
