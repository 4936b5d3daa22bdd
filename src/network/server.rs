//! TCP service speaking the JSON-lines protocol
//!
//! Each connection is served by its own task. Classification touches the
//! store (and possibly the journal file), so it runs on the blocking pool.

use super::protocol::{Request, RequestKind, Response};
use crate::classifier::{Classifier, Outcome};
use crate::dna::ValidationError;
use log::{debug, error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub struct Server {
    listener: TcpListener,
    classifier: Arc<Classifier>,
}

impl Server {
    pub async fn bind(addr: &str, classifier: Arc<Classifier>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, classifier })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("Listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Connection from {}", peer);
                        let classifier = self.classifier.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, classifier).await {
                                warn!("Connection {} closed with error: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                },
            }
        }
    }
}

async fn serve_connection(stream: TcpStream, classifier: Arc<Classifier>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match Request::from_line(&line) {
            Ok(request) => {
                let id = request.id.clone();
                let classifier = classifier.clone();
                tokio::task::spawn_blocking(move || handle(&classifier, request))
                    .await
                    .unwrap_or_else(|e| {
                        error!("Request worker failed: {}", e);
                        Response::error(id, 500, format!("request worker failed: {}", e))
                    })
            }
            Err(e) => malformed(e),
        };
        let out = response
            .to_line()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writer.write_all(out.as_bytes()).await?;
    }
    Ok(())
}

/// Answer one request line
pub fn respond(classifier: &Classifier, line: &str) -> Response {
    match Request::from_line(line) {
        Ok(request) => handle(classifier, request),
        Err(e) => malformed(e),
    }
}

fn malformed(e: serde_json::Error) -> Response {
    warn!("Malformed request: {}", e);
    Response::error(None, 400, format!("malformed request: {}", e))
}

fn handle(classifier: &Classifier, request: Request) -> Response {
    let id = request.id;
    match request.kind {
        RequestKind::Mutant { dna } => {
            let result = match dna {
                Some(rows) => classifier.analyze(&rows),
                None => {
                    warn!("Rejected DNA: {}", ValidationError::Missing);
                    Ok(Outcome::Invalid(ValidationError::Missing))
                }
            };
            match result {
                Ok(outcome) => Response::outcome(id, &outcome),
                Err(e) => {
                    error!("Classification failed: {}", e);
                    Response::error(id, e.status(), e.to_string())
                }
            }
        }
        RequestKind::Stats => match classifier.stats() {
            Ok(stats) => Response::stats(id, stats),
            Err(e) => {
                error!("Statistics failed: {}", e);
                Response::error(id, e.status(), e.to_string())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::OutcomeKind;
    use crate::dna::{Detector, Grid};
    use crate::storage::{FaultyStore, MemoryStore};
    use tokio::sync::oneshot;

    fn classifier() -> Classifier {
        Classifier::new(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_respond_mutant_and_human() {
        let c = classifier();
        let line = r#"{"id":"1","type":"mutant","dna":["AAAA","TCTT","GCGC","CCCC"]}"#;
        let resp = respond(&c, line);
        assert_eq!((resp.id.as_str(), resp.status), ("1", 200));
        assert_eq!(resp.outcome, Some(OutcomeKind::Mutant));

        let resp = respond(
            &c,
            r#"{"type":"mutant","dna":["ATGCGA","CAGTGC","TTATGT","AGACGG","GCGTCA","TCACTG"]}"#,
        );
        assert_eq!(resp.status, 403);
        assert_eq!(resp.outcome, Some(OutcomeKind::NonMutant));
    }

    #[test]
    fn test_respond_invalid_inputs() {
        let c = classifier();
        for line in [
            r#"{"type":"mutant"}"#,
            r#"{"type":"mutant","dna":null}"#,
            r#"{"type":"mutant","dna":[]}"#,
            r#"{"type":"mutant","dna":["AAAA","TCTT","GCGC"]}"#,
            r#"{"type":"mutant","dna":["AAAA","TCTT",null,"CCCC"]}"#,
            r#"{"type":"mutant","dna":["AAAA","TCTT","GCGC","CCC"]}"#,
            r#"{"type":"mutant","dna":["AAAA","TCTT","GCGC","CCCX"]}"#,
        ] {
            let resp = respond(&c, line);
            assert_eq!(resp.status, 400, "line {}", line);
            assert_eq!(resp.outcome, Some(OutcomeKind::InvalidInput));
        }
        assert_eq!(c.stats().unwrap().count_human_dna, 0);
        assert!(c.store().is_empty().unwrap());
    }

    #[test]
    fn test_respond_malformed_json() {
        let resp = respond(&classifier(), "{not json");
        assert_eq!(resp.status, 400);
        assert!(resp.outcome.is_none());
        assert!(resp.error.unwrap().starts_with("malformed request"));
    }

    #[test]
    fn test_respond_stats() {
        let c = classifier();
        respond(&c, r#"{"type":"mutant","dna":["AAAA","TCTT","GCGC","CCCC"]}"#);
        let resp = respond(&c, r#"{"type":"stats"}"#);
        assert_eq!(resp.status, 200);
        let stats = resp.stats.unwrap();
        assert_eq!(stats.count_mutant_dna, 1);
        assert_eq!(stats.count_human_dna, 0);
        assert_eq!(stats.ratio, 1.0);
    }

    #[test]
    fn test_respond_store_failures_as_internal_errors() {
        let c = Classifier::new(Arc::new(FaultyStore::Unavailable)).unwrap();
        let line = r#"{"id":"m","type":"mutant","dna":["AAAA","TCTT","GCGC","CCCC"]}"#;
        let resp = respond(&c, line);
        assert_eq!((resp.id.as_str(), resp.status), ("m", 500));
        assert!(resp.outcome.is_none());
        assert_eq!(resp.error.as_deref(), Some("store unavailable: disk gone"));

        let resp = respond(&c, r#"{"id":"s","type":"stats"}"#);
        assert_eq!((resp.id.as_str(), resp.status), ("s", 500));
        assert!(resp.stats.is_none());
        assert!(resp.error.is_some());
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn is_mutant(&self, _: &Grid) -> bool {
            panic!("detector crashed")
        }
    }

    #[tokio::test]
    async fn test_worker_failure_keeps_request_id() {
        let classifier =
            Classifier::with_detector(Arc::new(MemoryStore::new()), PanickingDetector).unwrap();
        let server = Server::bind("127.0.0.1:0", Arc::new(classifier)).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let running = tokio::spawn(server.run(async move {
            let _ = rx.await;
        }));

        let (reader, mut writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let request = Request::mutant(["AAAA", "TCTT", "GCGC", "CCCC"]).with_id("crash-1");
        writer.write_all(request.to_line().unwrap().as_bytes()).await.unwrap();
        let reply = BufReader::new(reader).lines().next_line().await.unwrap().unwrap();
        let resp = Response::from_line(&reply).unwrap();
        assert_eq!(resp.id, "crash-1");
        assert_eq!(resp.status, 500);

        tx.send(()).unwrap();
        running.await.unwrap().unwrap();
    }
}
