//! Page fetch worker
//!
//! A worker turns one [`Page`] into the bytes and entry name of its image:
//! it waits for admission, asks the site adapter where the image lives,
//! then downloads it through the retrying [`Fetcher`].

use crate::download::filename::{entry_name, image_extension};
use crate::download::scheduler::AdmissionGate;
use crate::download::Fetcher;
use crate::site::SiteAdapter;
use crate::state::Page;
use crate::FetchError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// A downloaded page, ready to be written into the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Archive entry name, e.g. `007-008.png`
    pub entry_name: String,

    /// Resolved image extension
    pub extension: String,

    pub bytes: Vec<u8>,
}

/// Exactly one outcome is produced for every submitted page
pub type PageOutcome = Result<FetchedPage, FetchError>;

/// Processes pages of one chapter under a shared admission gate
#[derive(Clone)]
pub struct PageWorker {
    site: Arc<dyn SiteAdapter>,
    fetcher: Arc<Fetcher>,
    gate: AdmissionGate,
}

impl PageWorker {
    pub fn new(site: Arc<dyn SiteAdapter>, fetcher: Arc<Fetcher>, gate: AdmissionGate) -> Self {
        Self {
            site,
            fetcher,
            gate,
        }
    }

    /// Fetches the image behind `page`
    ///
    /// The admission permit is held until this function returns.
    pub async fn process(&self, page: &Page) -> PageOutcome {
        let _permit = self.gate.admit().await.ok_or(FetchError::Cancelled)?;
        trace!("Admitted page {} ({})", page.name, page.uri);

        let locator = match self.site.resolve_image_locator(&page.uri).await {
            Ok(Some(locator)) => locator,
            Ok(None) => {
                return Err(FetchError::ImageNotFound {
                    page_uri: page.uri.clone(),
                })
            }
            Err(e) => {
                return Err(FetchError::Lookup {
                    page_uri: page.uri.clone(),
                    message: e.to_string(),
                })
            }
        };

        let extension = image_extension(&locator);
        let entry_name = entry_name(&page.name, &locator);
        debug!("Page {} resolved to {}", page.name, locator);

        let bytes = self.fetcher.fetch(&locator, &page.uri).await?;

        Ok(FetchedPage {
            entry_name,
            extension,
            bytes,
        })
    }

    /// Runs [`process`](Self::process) for `page` on its own task
    pub fn spawn(&self, page: Page) -> JoinHandle<PageOutcome> {
        let worker = self.clone();
        tokio::spawn(async move { worker.process(&page).await })
    }
}
