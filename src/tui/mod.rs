//! Terminal UI engine: a single-threaded, cooperative render/input loop.
//!
//! Each tick: drive the demo feed if present, poll one key, route it, apply
//! any resulting bus traffic, then redraw if anything changed. Nothing in
//! the loop blocks (input reads are non-blocking and event handlers only
//! mutate in-memory state), so a short sleep bounds CPU usage.

// === Submodules ===

pub mod app;
pub mod input;
pub mod layout;
pub mod render;
pub mod viewport;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::bus::EventBus;
use crate::core::events::{EventKind, UiEvent};
use crate::demo::DemoFeed;
use crate::settings::Settings;
use crate::term::{self, RawModeGuard, TermCaps};

use app::{App, AppAction};
use input::{InputDecoder, StdinSource};

// === External stop signal ===

/// Set from the signal handler, consumed by the loop. SIGINT/SIGTERM must
/// not take the default disposition: the process would die without dropping
/// [`RawModeGuard`], leaving the terminal raw and no-echo.
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn request_stop(_signal: libc::c_int) {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the stop flag. The handler only touches an
/// atomic; all cleanup happens on the loop thread when it sees the flag.
#[cfg(unix)]
fn install_stop_handlers() {
    let handler = request_stop as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: installing an async-signal-safe handler (one atomic store).
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

#[cfg(not(unix))]
fn install_stop_handlers() {}

/// Consume the stop flag so a handled request stops exactly one run.
fn stop_requested() -> bool {
    STOP_REQUESTED.swap(false, Ordering::SeqCst)
}

/// Run the dashboard until the user quits.
///
/// Raw mode is held by a guard for exactly the duration of this function;
/// every exit path (quit key, error, panic unwind) restores cooked mode and
/// the cursor before the farewell line is printed.
pub fn run(
    bus: &Rc<EventBus>,
    settings: &Settings,
    caps: TermCaps,
    feed: Option<Rc<RefCell<DemoFeed>>>,
) -> Result<()> {
    let app = Rc::new(RefCell::new(App::new(settings)));

    // The controller's subscriptions: each handler applies one event to UI
    // state synchronously on this thread.
    let subscriptions: Vec<_> = [
        EventKind::Processing,
        EventKind::StateUpdate,
        EventKind::TaskUpdate,
        EventKind::ToolStarted,
        EventKind::ToolCompleted,
        EventKind::Assistant,
        EventKind::Error,
    ]
    .into_iter()
    .map(|kind| {
        let app = Rc::clone(&app);
        bus.subscribe(kind, move |event| app.borrow_mut().apply_event(event))
    })
    .collect();
    tracing::debug!(subscribers = bus.subscriber_count(), "controller attached");

    let result = run_loop(bus, settings, caps, &app, feed);

    for id in subscriptions {
        bus.unsubscribe(id);
    }
    result
}

fn run_loop(
    bus: &Rc<EventBus>,
    settings: &Settings,
    caps: TermCaps,
    app: &Rc<RefCell<App>>,
    feed: Option<Rc<RefCell<DemoFeed>>>,
) -> Result<()> {
    let _guard = RawModeGuard::acquire().context("failed to enter raw mode")?;
    install_stop_handlers();
    let mut stdout = io::stdout();
    term::set_title(&mut stdout, "agentdeck")?;
    term::hide_cursor(&mut stdout)?;

    let mut source = StdinSource::new().context("failed to open non-blocking stdin")?;
    let mut decoder = InputDecoder::new();
    let tick = Duration::from_millis(settings.tick_ms);
    let mut last_size = term::terminal_size();

    loop {
        if stop_requested() {
            tracing::info!("external stop signal");
            break;
        }
        if let Some(feed) = &feed {
            feed.borrow_mut().tick(bus);
        }

        // At most one key per tick; decode failures and pending-sequence
        // ambiguity both surface as "no key" here.
        let action = match decoder.poll(&mut source) {
            Some(key) => {
                tracing::debug!(?key, "key decoded");
                app.borrow_mut().handle_key(key)
            }
            None => None,
        };
        match action {
            Some(AppAction::Quit) => break,
            Some(AppAction::SubmitInput(text)) => {
                // Emitted outside of any App borrow: handlers on this bus
                // may re-enter UI state.
                bus.emit(&UiEvent::UserInput { text });
            }
            None => {}
        }

        let size = term::terminal_size();
        if size != last_size {
            last_size = size;
            app.borrow_mut().dirty = true;
        }

        if app.borrow().dirty {
            let frame = {
                let mut app = app.borrow_mut();
                let frame = render::draw_frame(&mut app, &caps, size.0, size.1);
                app.dirty = false;
                frame
            };
            stdout.write_all(frame.as_bytes())?;
            stdout.flush()?;
        }

        std::thread::sleep(tick);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn stop_flag_is_set_by_the_handler_and_consumed_once() {
        assert!(!stop_requested());
        request_stop(libc::SIGTERM);
        assert!(stop_requested(), "a signal requests exactly one stop");
        assert!(!stop_requested(), "the request does not linger");
    }
}
