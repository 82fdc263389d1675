use crate::domain::model::{IntermediateSignal, Player};
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn map_record(player: &Player) -> IntermediateSignal {
    IntermediateSignal {
        age: player.age,
        count: 1,
    }
}

/// Maps `players[index]` and pushes the signal onto the shared intermediate channel.
pub async fn run_mapper(
    players: Arc<[Player]>,
    index: usize,
    sender: mpsc::Sender<IntermediateSignal>,
) -> Result<()> {
    let signal = map_record(&players[index]);
    sender
        .send(signal)
        .await
        .map_err(|_| EtlError::ChannelClosed { stage: "mapper" })
}
