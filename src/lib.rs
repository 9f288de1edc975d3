pub mod lifetime;
pub mod player;
pub mod store;

use clap::Parser;

#[derive(Parser)]
#[command(name = "mpris-mock-player", version, about = "Mock MPRIS media player fixture")]
pub struct Args {
    /// Well-known bus name to claim
    #[arg(long, default_value = player::BUS_NAME)]
    pub bus_name: String,
    /// Watchdog bound in seconds; the process force-exits after this long
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

/// Whether a session bus is even configured on this machine. Covers the two
/// places zbus looks: the address variable and the XDG runtime socket. A
/// missing bus is a harness "skip", not a failure, so the caller exits 0.
pub fn session_bus_available() -> bool {
    if std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some() {
        return true;
    }
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(|dir| std::path::Path::new(&dir).join("bus").exists())
        .unwrap_or(false)
}
