//! Offset pagination over the user directory.

use tracing::{debug, info};

use crate::{Account, Error, UserDirectory};

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// The largest `maxResults` value Jira accepts for the user listing.
pub const MAX_PAGE_SIZE: usize = 1000;

/// A lazy walk over every page of the user directory.
///
/// Each call to [`UserPages::next_page`] issues at most one request. The walk ends when
/// the service returns an empty page or a page shorter than the requested size. After
/// an error the walk is finished; there is no way to resume a failed listing.
pub struct UserPages<'a, D: UserDirectory + ?Sized> {
    directory: &'a D,
    page_size: usize,
    start_at: usize,
    finished: bool,
}

impl<'a, D: UserDirectory + ?Sized> UserPages<'a, D> {
    /// Starts a new walk from the first page.
    ///
    /// # Errors
    /// Returns `Error::InvalidRequest` if `page_size` is zero or above [`MAX_PAGE_SIZE`].
    pub fn new(directory: &'a D, page_size: usize) -> Result<Self, Error> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidRequest(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        Ok(Self {
            directory,
            page_size,
            start_at: 0,
            finished: false,
        })
    }

    /// Number of accounts received so far.
    pub fn fetched(&self) -> usize {
        self.start_at
    }

    /// Fetches the next page, or `None` once the directory is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Account>>, Error> {
        if self.finished {
            return Ok(None);
        }

        debug!(start_at = self.start_at, page_size = self.page_size, "Requesting page");
        let page = match self
            .directory
            .list_users_page(self.start_at, self.page_size)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        if page.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        self.start_at += page.len();
        if page.len() < self.page_size {
            self.finished = true;
        }

        Ok(Some(page))
    }
}

/// Fetches every account in the directory, in the order the service returns them.
///
/// Always starts from the first page. A failure on any page aborts the listing and
/// no partial result is returned.
///
/// # Example
///
/// ```rust,no_run
/// use jira_client::{list_all_users, Credentials, JiraClient, DEFAULT_PAGE_SIZE};
///
/// # async fn example() -> Result<(), jira_client::Error> {
/// let client = JiraClient::for_domain("example", Credentials::new("me@example.com", "token"))?;
/// let accounts = list_all_users(&client, DEFAULT_PAGE_SIZE).await?;
/// println!("{} accounts", accounts.len());
/// # Ok(())
/// # }
/// ```
pub async fn list_all_users<D: UserDirectory + ?Sized>(
    directory: &D,
    page_size: usize,
) -> Result<Vec<Account>, Error> {
    let mut pages = UserPages::new(directory, page_size)?;
    let mut accounts = Vec::new();

    while let Some(page) = pages.next_page().await? {
        accounts.extend(page);
    }

    info!(count = accounts.len(), "Listed all users");
    Ok(accounts)
}
