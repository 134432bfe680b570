//! TCP server and the single arena task
//!
//! Connection tasks only parse lines and forward them. One game task owns the
//! `Arena`, drains the inbox between ticks, advances the round loop at a fixed
//! cadence and fans messages out: broadcasts over a `broadcast` channel,
//! replies over each connection's own queue.

use ahash::AHashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::config::ArenaConfig;
use crate::core::error::{CommandError, Result};
use crate::core::types::OwnerId;
use crate::net::protocol::{decode_line, encode_line, ClientMsg, ServerMsg};
use crate::orchestrator::{Arena, Outbound};

/// One encoded, newline-terminated message
type Line = Arc<str>;

const INBOX_CAPACITY: usize = 256;
const BROADCAST_CAPACITY: usize = 256;

/// Everything a connection task can tell the game task
#[derive(Debug)]
pub enum Inbound {
    Connect {
        outbox: mpsc::UnboundedSender<Line>,
        reply: oneshot::Sender<std::result::Result<OwnerId, CommandError>>,
    },
    Message {
        player: OwnerId,
        msg: ClientMsg,
    },
    Disconnect {
        player: OwnerId,
    },
}

pub struct ArenaServer {
    listener: TcpListener,
    config: ArenaConfig,
}

impl ArenaServer {
    pub async fn bind(addr: impl ToSocketAddrs, config: ArenaConfig) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever
    pub async fn run(self) -> Result<()> {
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (updates_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        info!(
            addr = %self.listener.local_addr()?,
            max_players = self.config.max_players,
            "arena listening"
        );

        let game = GameTask {
            arena: Arena::new(self.config),
            inbox: inbox_rx,
            updates: updates_tx.clone(),
            outboxes: AHashMap::new(),
        };
        tokio::spawn(game.run());

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let inbox = inbox_tx.clone();
            // Subscribe before the connect request so the first broadcasts are not missed
            let updates = updates_tx.subscribe();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, peer, inbox, updates).await {
                    debug!(%peer, error = %err, "connection closed with error");
                }
            });
        }
    }
}

struct GameTask {
    arena: Arena,
    inbox: mpsc::Receiver<Inbound>,
    updates: broadcast::Sender<Line>,
    outboxes: AHashMap<OwnerId, mpsc::UnboundedSender<Line>>,
}

impl GameTask {
    async fn run(mut self) {
        let period = Duration::from_millis(self.arena.config().tick_millis());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if !self.drain_inbox() {
                info!("all senders gone, arena task stopping");
                break;
            }

            let out = self.arena.advance();
            self.dispatch(out);
        }
    }

    /// Apply every queued request. Returns false once the inbox is closed.
    fn drain_inbox(&mut self) -> bool {
        loop {
            match self.inbox.try_recv() {
                Ok(inbound) => self.apply(inbound),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Connect { outbox, reply } => match self.arena.connect() {
                Ok((player, out)) => {
                    self.outboxes.insert(player, outbox);
                    self.dispatch(out);
                    if reply.send(Ok(player)).is_err() {
                        // Client vanished while waiting
                        self.outboxes.remove(&player);
                        let out = self.arena.disconnect(player);
                        self.dispatch(out);
                    }
                }
                Err(err) => {
                    let _ = reply.send(Err(err));
                }
            },
            Inbound::Message { player, msg } => {
                let out = self.arena.handle(player, msg);
                self.dispatch(out);
            }
            Inbound::Disconnect { player } => {
                self.outboxes.remove(&player);
                let out = self.arena.disconnect(player);
                self.dispatch(out);
            }
        }
    }

    fn dispatch(&self, out: Vec<Outbound>) {
        for item in out {
            let (target, msg) = match item {
                Outbound::All(msg) => (None, msg),
                Outbound::To(player, msg) => (Some(player), msg),
            };
            let line: Line = match encode_line(&msg) {
                Ok(line) => line.into(),
                Err(err) => {
                    warn!(error = %err, "failed to encode server message");
                    continue;
                }
            };
            match target {
                // No subscribers is fine
                None => {
                    let _ = self.updates.send(line);
                }
                Some(player) => {
                    if let Some(outbox) = self.outboxes.get(&player) {
                        let _ = outbox.send(line);
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    inbox: mpsc::Sender<Inbound>,
    mut updates: broadcast::Receiver<Line>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let (outbox, mut direct) = mpsc::unbounded_channel::<Line>();
    let (reply_tx, reply_rx) = oneshot::channel();

    if inbox
        .send(Inbound::Connect {
            outbox,
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        return Ok(());
    }
    let player = match reply_rx.await {
        Ok(Ok(player)) => player,
        Ok(Err(err)) => {
            info!(%peer, error = %err, "connection refused");
            writer
                .write_all(encode_line(&ServerMsg::error(err.to_string()))?.as_bytes())
                .await?;
            return Ok(());
        }
        Err(_) => return Ok(()),
    };
    debug!(%peer, %player, "session opened");

    let mut lines = BufReader::new(reader).lines();
    let result = async {
        loop {
            tokio::select! {
                biased;
                Some(line) = direct.recv() => {
                    writer.write_all(line.as_bytes()).await?;
                }
                update = updates.recv() => match update {
                    Ok(line) => writer.write_all(line.as_bytes()).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%player, skipped, "client fell behind, dropped broadcasts");
                    }
                    Err(RecvError::Closed) => break,
                },
                line = lines.next_line() => {
                    let Some(text) = line? else { break };
                    if text.trim().is_empty() {
                        continue;
                    }
                    match decode_line(&text) {
                        Ok(msg) => {
                            if inbox.send(Inbound::Message { player, msg }).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            warn!(%player, error = %err, "unreadable client message");
                            writer
                                .write_all(encode_line(&ServerMsg::error("Unknown command"))?.as_bytes())
                                .await?;
                        }
                    }
                }
            }
        }
        Ok::<(), crate::core::error::ArenaError>(())
    }
    .await;

    let _ = inbox.send(Inbound::Disconnect { player }).await;
    debug!(%peer, %player, "session closed");
    result
}
