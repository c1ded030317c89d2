use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

/// Message pipe to the authority. Bodies are whole messages; framing is the transport's concern.
pub trait Transport {
    /// Next complete inbound message, without blocking.
    fn try_receive(&mut self) -> Option<Vec<u8>>;
    fn send(&mut self, message: &[u8]);
}

/// In-process transport over a pair of unbounded channels.
pub struct ChannelTransport {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl ChannelTransport {
    /// Two connected ends; what one sends the other receives.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();
        (Self { tx: a_tx, rx: a_rx }, Self { tx: b_tx, rx: b_rx })
    }
}

impl Transport for ChannelTransport {
    fn try_receive(&mut self) -> Option<Vec<u8>> {
        match self.rx.try_recv() {
            Ok(m) => Some(m),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::trace!(target: "events", "transport peer gone");
                None
            }
        }
    }

    fn send(&mut self, message: &[u8]) {
        if self.tx.send(message.to_vec()).is_err() {
            log::debug!("dropping {} byte message: peer disconnected", message.len());
        }
    }
}
