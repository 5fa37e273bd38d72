//! Dispatcher task: the only consumer of the event bus.

use defmt::trace;

use compass_core::{Board, Boot, StateMachine};

use crate::shared::EVENTS;

pub async fn run<B: Board>(mut machine: StateMachine<B>, boot: Boot) -> ! {
    machine.start(boot).await;

    loop {
        let event = EVENTS.receive().await;
        trace!("event {:?} from {:?}", event.kind, event.source);
        machine.dispatch(event).await;
    }
}
