fn main() {
    // Without any setup the global registry writes to STDOUT and STDERR using the detected profile
    let default = loog::registry();
    default.debug("default debug");
    default.log("default log");
    default.info("default info");
    default.warn("default warn");
    default.error("default error");
    loog::info!(default, "{default:?}");

    let logger = loog::get("Showcase");
    logger.debug("debug");
    logger.log("log");
    logger.info("info");
    logger.warn("warn");
    logger.error("error");

    default.disable();
    default.debug("This message is never printed");
}
