use crate::events::{
    dispatcher,
    model::{LogEvent, LogLevel, NetworkEvent, ReplicationEvent},
};

/// Emit a structured network event with optional console output suppression.
pub(crate) fn emit_network_event(
    component: &'static str,
    level: LogLevel,
    action: &str,
    addr: Option<String>,
    detail: Option<String>,
    allow_console: bool,
) {
    let mut meta = dispatcher::meta(component, level);
    meta.corr_id = Some(dispatcher::correlation_id());
    if !allow_console {
        meta.suppress_console = true;
    }
    dispatcher::emit(LogEvent::Network(NetworkEvent {
        meta,
        action: action.to_string(),
        addr,
        detail,
    }));
}

/// Emit a structured replication event (batch handed to the tally store).
pub(crate) fn emit_replication_event(
    level: LogLevel,
    action: &str,
    records: usize,
    detail: Option<String>,
    allow_console: bool,
) {
    let mut meta = dispatcher::meta("replication", level);
    meta.corr_id = Some(dispatcher::correlation_id());
    if !allow_console {
        meta.suppress_console = true;
    }
    dispatcher::emit(LogEvent::Replication(ReplicationEvent {
        meta,
        action: action.to_string(),
        records,
        detail,
    }));
}
