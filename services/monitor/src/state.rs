//! Per-monitor state machine (spec.md §4.4).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Init,
    CatchingUp,
    Live,
    Reconnecting,
    Stopped,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MonitorState::Init => "INIT",
            MonitorState::CatchingUp => "CATCHING_UP",
            MonitorState::Live => "LIVE",
            MonitorState::Reconnecting => "RECONNECTING",
            MonitorState::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}
