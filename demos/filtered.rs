use loog::Level;

fn main() {
    loog::LoggerBuilder::new()
        .with_timestamps(true)
        .install_log_bridge()
        .build_global()
        // Nothing else installs a registry or a `log` backend in this program
        .expect("A logger has already been set up");

    some_module::log();

    // Loggers created after this call also start out at the warning level
    loog::set_level_all(Level::Warn);
    some_module::log();
    loog::get("filtered::some_module").set_level(Level::Debug);
    some_module::log();
}

mod some_module {
    pub fn log() {
        // The `log` crate's macros are routed to the logger named after the module path
        log::debug!("This message only shows up when the module's level allows it");
        log::warn!("This warning is always printed");
    }
}
