use crate::events::types::AppEvent;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use std::io::stdout;
use std::{sync::mpsc, thread::JoinHandle};
use tracing::{debug, error};

pub fn spawn(event_tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let _ = execute!(stdout(), EnableMouseCapture);

        loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                    event_tx.send(AppEvent::Input(key_event))
                }
                Ok(Event::Mouse(mouse_event)) => event_tx.send(AppEvent::Mouse(mouse_event)),
                Ok(Event::Resize(_, _)) => event_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    error!("terminal input error: {}", e);
                    break;
                }
            };

            if forwarded.is_err() {
                debug!("event channel closed, input thread exiting");
                break;
            }
        }

        let _ = execute!(stdout(), DisableMouseCapture);
    })
}
