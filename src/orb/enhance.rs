//! Optional WebGL-style sphere for the orb.
//!
//! The flat orb is fully functional on its own. A sphere module is loaded on
//! a background thread; success adds a canvas node, failure is logged and
//! never retried on the same page.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::dom::Document;
use crate::error::{OrbError, Result};
use crate::orb::shell::OrbDomRefs;

/// A loaded sphere module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SphereModule {
    pub source: String,
    pub bytes: usize,
}

pub trait SphereEnhancer: Send + Sync {
    fn load(&self) -> Result<SphereModule>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancementStatus {
    /// No enhancer configured.
    Disabled,
    Loading,
    Applied,
    Failed,
}

pub struct Enhancement {
    status: EnhancementStatus,
    rx: Option<Receiver<Result<SphereModule>>>,
}

impl Enhancement {
    pub fn disabled() -> Self {
        Self {
            status: EnhancementStatus::Disabled,
            rx: None,
        }
    }

    /// Kick off the load on its own thread.
    pub fn start(enhancer: Arc<dyn SphereEnhancer>) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("orb-sphere".into())
            .spawn(move || {
                let _ = tx.send(enhancer.load());
            });
        match spawned {
            Ok(_) => Self {
                status: EnhancementStatus::Loading,
                rx: Some(rx),
            },
            Err(e) => {
                log::warn!("could not start sphere loader: {}", e);
                Self {
                    status: EnhancementStatus::Failed,
                    rx: None,
                }
            }
        }
    }

    pub fn status(&self) -> EnhancementStatus {
        self.status
    }

    /// Non-blocking check; applies the result once it arrives.
    pub fn poll(&mut self, doc: &mut Document, refs: &OrbDomRefs) -> EnhancementStatus {
        let received = match &self.rx {
            Some(rx) => match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(OrbError::Enhancement(
                    "loader thread exited without a result".into(),
                ))),
            },
            None => None,
        };
        if let Some(result) = received {
            self.finish(doc, refs, result);
        }
        self.status
    }

    /// Block up to `timeout` for the load to finish.
    pub fn wait(&mut self, doc: &mut Document, refs: &OrbDomRefs, timeout: Duration) -> EnhancementStatus {
        let received = match &self.rx {
            Some(rx) => match rx.recv_timeout(timeout) {
                Ok(result) => Some(result),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
                Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(OrbError::Enhancement(
                    "loader thread exited without a result".into(),
                ))),
            },
            None => None,
        };
        if let Some(result) = received {
            self.finish(doc, refs, result);
        }
        self.status
    }

    fn finish(&mut self, doc: &mut Document, refs: &OrbDomRefs, result: Result<SphereModule>) {
        self.rx = None;
        match result {
            Ok(module) => {
                let canvas = doc.create_element("canvas");
                doc.add_class(canvas, "orb-sphere-canvas");
                doc.set_attr(canvas, "data-source", &module.source);
                doc.append_child(refs.orb, canvas);
                doc.add_class(refs.container, "has-sphere");
                log::info!("orb sphere enhancement applied ({} bytes)", module.bytes);
                self.status = EnhancementStatus::Applied;
            }
            Err(e) => {
                log::warn!("orb sphere enhancement unavailable, keeping flat orb: {}", e);
                self.status = EnhancementStatus::Failed;
            }
        }
    }
}

/// Fetches the sphere module over HTTP.
#[cfg(feature = "cdn-sphere")]
pub struct CdnSphereLoader {
    url: String,
}

#[cfg(feature = "cdn-sphere")]
impl CdnSphereLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(feature = "cdn-sphere")]
impl SphereEnhancer for CdnSphereLoader {
    fn load(&self) -> Result<SphereModule> {
        let parsed = url::Url::parse(&self.url)?;
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("inque-orb/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OrbError::Enhancement(format!("client error: {}", e)))?;

        let response = client
            .get(parsed.as_str())
            .send()
            .map_err(|e| OrbError::Enhancement(format!("request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OrbError::Enhancement(format!("HTTP {} from {}", status, parsed)));
        }
        let body = response
            .bytes()
            .map_err(|e| OrbError::Enhancement(format!("failed to read body: {}", e)))?;

        Ok(SphereModule {
            source: parsed.to_string(),
            bytes: body.len(),
        })
    }
}
