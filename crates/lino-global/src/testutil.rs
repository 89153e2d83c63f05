// crates/lino-global/src/testutil.rs
//
// Shared fixtures for unit tests.

use lino_core::coin::Coin;
use lino_core::error::LinoError;
use lino_core::event::{CoinReturnEvent, Event, ReturnType};
use lino_core::param::{GlobalAllocationParam, GlobalInitParams, ProposalParam};
use lino_core::time::BlockHeader;
use lino_store::MemStore;

use crate::context::Context;
use crate::executor::EventExecutor;
use crate::manager::GlobalManager;
use crate::model::GlobalTime;

/// Genesis with default parameters and 10^10 LINO. A non-zero `chain_start`
/// also starts the block clock there.
pub fn genesis(store: &mut MemStore, chain_start: i64) -> GlobalManager {
    let gm = GlobalManager::new();
    gm.params()
        .init_param(
            store,
            &GlobalAllocationParam::default(),
            &ProposalParam::default(),
            &GlobalInitParams::default(),
        )
        .unwrap();
    let mut ctx = Context::new(store, BlockHeader::new(1, chain_start, 0));
    gm.init_global_manager(&mut ctx, Coin::from_lino(10_000_000_000))
        .unwrap();
    if chain_start != 0 {
        let time = GlobalTime {
            chain_start_time: chain_start,
            last_block_time: chain_start,
            past_minutes: 0,
        };
        gm.storage.set_global_time(ctx.store_mut(), &time).unwrap();
    }
    gm
}

pub fn coin_return(name: &str, amount: i128) -> Event {
    CoinReturnEvent {
        username: name.to_string(),
        amount: Coin::new(amount),
        return_type: ReturnType::VoteReturn,
    }
    .into()
}

/// Records the username of each coin-return event it runs and marks it in
/// the store. `fail` errors after writing; `spawn` schedules a follow-up.
#[derive(Default)]
pub struct RecordingExecutor {
    pub seen: Vec<String>,
}

impl EventExecutor for RecordingExecutor {
    fn execute(&mut self, ctx: &mut Context<'_>, event: &Event) -> Result<(), LinoError> {
        let Event::CoinReturn(e) = event else {
            return Err(LinoError::InvalidEvent(event.kind().to_string()));
        };
        self.seen.push(e.username.clone());
        ctx.store_mut()
            .set(format!("mark/{}", e.username).as_bytes(), b"1")?;
        match e.username.as_str() {
            "fail" => Err(LinoError::InvalidState("refused".to_string())),
            "spawn" => {
                let at = ctx.block_time() + 60;
                GlobalManager::new().register_event_at_time(ctx, at, coin_return("child", 1))
            }
            _ => Ok(()),
        }
    }
}
