//! Action dispatcher — one Maker API request per device action.
//!
//! `GET {base_url}/{device}/{action}[/{secondary}]?access_token={token}`

use url::Url;

use hubbridge_domain::command::Command;
use hubbridge_domain::device::HubDevice;

use crate::error::CommandError;

/// Sends device actions to the hub.
///
/// Cheap to share: the inner [`reqwest::Client`] pools connections and may
/// be used by any number of concurrent dispatches.
#[derive(Clone)]
pub struct ActionDispatcher {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl ActionDispatcher {
    /// Create a dispatcher for the given Maker API base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: Url, access_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            access_token: access_token.into(),
        }
    }

    /// Full request URL for a command, access token included.
    #[must_use]
    pub fn command_target(&self, command: &Command) -> Url {
        let mut target = self.base_url.clone();
        if let Ok(mut segments) = target.path_segments_mut() {
            segments.pop_if_empty().extend(command.path_segments());
        }
        target
            .query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        target
    }

    /// Send one action to a device and wait for the hub's answer.
    ///
    /// Only the first element of `args` is used. Exactly one request is
    /// sent; a failure is returned as-is and never retried here.
    ///
    /// # Errors
    ///
    /// - [`CommandError::Invalid`] if the device id or action is blank, or a
    ///   segment would resolve as `.` or `..`
    /// - [`CommandError::Unreachable`] if the request cannot complete
    /// - [`CommandError::Rejected`] if the hub answers with a non-2xx status
    pub async fn dispatch<D, S>(
        &self,
        device: &D,
        action: &str,
        args: &[S],
    ) -> Result<(), CommandError>
    where
        D: HubDevice + ?Sized,
        S: AsRef<str>,
    {
        let command = Command::new(device, action, args)?;
        let target = self.command_target(&command);
        let redacted = redact(&target);

        tracing::info!(url = %redacted, "sending command to hub");

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|err| CommandError::Unreachable {
                target: redacted.clone(),
                source: err.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %redacted, %status, "hub rejected command");
            return Err(CommandError::Rejected {
                target: redacted,
                status,
            });
        }

        tracing::debug!(url = %redacted, %status, "command accepted");
        Ok(())
    }
}

/// Render a URL without its query string.
pub(crate) fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}
