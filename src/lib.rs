/*
 * YSFlight Pack Builder: the model/controller layer for a desktop tool that
 * assembles addon packs (aircraft, ground objects, scenery) for YSFlight.
 *
 * The crate is split the same way the application is: `core` holds the
 * platform-agnostic domain logic (entry model, DAT identify extraction, LST
 * line formatting, the project save-file codec, pack assembly and settings
 * persistence), and `app_logic` holds the Presenter/Controller that a
 * presentation layer drives with `AppEvent`s and renders from `UiCommand`s.
 * No windowing code lives here; a GUI front-end is expected to own the event
 * loop. All logging goes through the `log` facade; `initialize_logging`
 * installs the `simplelog` backend and is called by the front-end at startup
 * and by the test harnesses.
 */
pub mod app_logic;
pub mod core;

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/*
 * Installs a simplelog backend for the `log` facade. Idempotent, so every
 * test setup can call it without coordinating; prefers a terminal logger and
 * falls back to the plain logger where no terminal is attached.
 */
pub fn initialize_logging() {
    LOGGING_INIT.call_once(|| {
        let config = simplelog::Config::default();
        if simplelog::TermLogger::init(
            simplelog::LevelFilter::Debug,
            config.clone(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
        .is_err()
        {
            let _ = simplelog::SimpleLogger::init(simplelog::LevelFilter::Debug, config);
        }
    });
}
