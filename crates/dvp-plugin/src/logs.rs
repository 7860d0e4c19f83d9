//! # Plugin Log Download
//!
//! Fetches a plugin's logs from an engine through an [`EngineClient`].
//! The transport is supplied by the caller; this module normalizes the
//! arguments, logs in with [`ENGINE_API_VERSION`], and asks for the logs.

use std::path::{Path, PathBuf};

use dvp_core::encoding::to_str;
use dvp_core::{ApiVersion, CoreError, NestedValue, ENGINE_API_VERSION};

use crate::error::{PluginError, PluginResult};

/// Session with a remote engine.
pub trait EngineClient {
    /// Authenticate. Must succeed before any other call.
    fn login(&mut self, api_version: &ApiVersion, user: &str, password: &str) -> PluginResult<()>;

    /// Download the logs of the plugin described by `plugin_config` into
    /// `directory`.
    fn download_plugin_logs(&mut self, directory: &Path, plugin_config: &Path) -> PluginResult<()>;
}

impl<T: EngineClient + ?Sized> EngineClient for &mut T {
    fn login(&mut self, api_version: &ApiVersion, user: &str, password: &str) -> PluginResult<()> {
        (**self).login(api_version, user, password)
    }

    fn download_plugin_logs(&mut self, directory: &Path, plugin_config: &Path) -> PluginResult<()> {
        (**self).download_plugin_logs(directory, plugin_config)
    }
}

/// Arguments to [`download_logs`], each either text or raw bytes.
#[derive(Debug, Clone)]
pub struct DownloadLogsRequest {
    pub engine: NestedValue,
    pub plugin_config: NestedValue,
    pub user: NestedValue,
    pub password: NestedValue,
    pub directory: NestedValue,
}

/// Download plugin logs from `engine`.
///
/// `connect` opens a client for the normalized engine address.
///
/// # Errors
///
/// [`PluginError::Core`] if an argument cannot be decoded to text, plus
/// whatever `connect` or the client returns.
pub fn download_logs<C, F>(connect: F, request: DownloadLogsRequest) -> PluginResult<()>
where
    C: EngineClient,
    F: FnOnce(&str) -> PluginResult<C>,
{
    tracing::debug!(
        engine = ?request.engine,
        plugin_config = ?request.plugin_config,
        user = ?request.user,
        directory = ?request.directory,
        "download parameters"
    );
    tracing::info!(
        "downloading plugin logs from {:?} to: {:?}",
        request.engine,
        request.directory
    );

    let engine = text_arg("engine", request.engine)?;
    let plugin_config = PathBuf::from(text_arg("plugin_config", request.plugin_config)?);
    let user = text_arg("user", request.user)?;
    let password = text_arg("password", request.password)?;
    let directory = PathBuf::from(text_arg("directory", request.directory)?);

    let mut client = connect(&engine)?;
    client.login(&ENGINE_API_VERSION, &user, &password)?;
    client.download_plugin_logs(&directory, &plugin_config)
}

fn text_arg(field: &str, value: NestedValue) -> PluginResult<String> {
    match to_str(value, None).map_err(CoreError::from)? {
        NestedValue::Text(text) => Ok(text),
        other => Err(PluginError::Validation(format!(
            "{field} must be text, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingClient {
        calls: Vec<String>,
        reject_login: bool,
    }

    impl EngineClient for RecordingClient {
        fn login(
            &mut self,
            api_version: &ApiVersion,
            user: &str,
            password: &str,
        ) -> PluginResult<()> {
            if self.reject_login {
                return Err(PluginError::Engine("authentication failed".to_string()));
            }
            self.calls.push(format!("login {user} {api_version} {password}"));
            Ok(())
        }

        fn download_plugin_logs(
            &mut self,
            directory: &Path,
            plugin_config: &Path,
        ) -> PluginResult<()> {
            self.calls.push(format!(
                "download {} {}",
                directory.display(),
                plugin_config.display()
            ));
            Ok(())
        }
    }

    fn session<'a>(
        client: &'a mut RecordingClient,
    ) -> impl FnOnce(&str) -> PluginResult<&'a mut RecordingClient> + 'a {
        move |_| Ok(client)
    }

    fn request() -> DownloadLogsRequest {
        DownloadLogsRequest {
            engine: "engine.example".into(),
            plugin_config: b"/work/plugin_config.yml".to_vec().into(),
            user: "admin".into(),
            password: "s3cret".into(),
            directory: "/tmp/logs".into(),
        }
    }

    #[test]
    fn connects_to_normalized_engine() {
        let mut client = RecordingClient::default();
        let mut seen = None;
        let (slot, conn) = (&mut seen, &mut client);
        download_logs(
            move |engine| {
                *slot = Some(engine.to_string());
                Ok(conn)
            },
            request(),
        )
        .unwrap();
        assert_eq!(seen.as_deref(), Some("engine.example"));
    }

    #[test]
    fn logs_in_then_downloads() {
        let mut client = RecordingClient::default();
        download_logs(session(&mut client), request()).unwrap();
        assert_eq!(
            client.calls,
            vec![
                format!("login admin {ENGINE_API_VERSION} s3cret"),
                "download /tmp/logs /work/plugin_config.yml".to_string(),
            ]
        );
    }

    #[test]
    fn login_failure_stops_before_download() {
        let mut client = RecordingClient {
            reject_login: true,
            ..RecordingClient::default()
        };
        let err = download_logs(session(&mut client), request()).unwrap_err();
        assert!(matches!(err, PluginError::Engine(_)));
        assert!(client.calls.is_empty());
    }

    #[test]
    fn undecodable_utf8_falls_back_to_latin1() {
        let mut req = request();
        req.user = vec![0x6a, 0xf6, 0x72].into();
        let mut client = RecordingClient::default();
        download_logs(session(&mut client), req).unwrap();
        assert!(client.calls[0].starts_with("login jör "));
    }

    #[test]
    fn non_text_argument_is_rejected() {
        let mut req = request();
        req.directory = NestedValue::Int(7);
        let mut client = RecordingClient::default();
        let err = download_logs(session(&mut client), req).unwrap_err();
        assert!(matches!(err, PluginError::Validation(_)));
        assert!(client.calls.is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn parameters_are_logged_before_decoding() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let mut req = request();
        req.engine = NestedValue::Int(7);
        let mut client = RecordingClient::default();
        let err = tracing::subscriber::with_default(subscriber, || {
            download_logs(session(&mut client), req)
        })
        .unwrap_err();
        assert!(matches!(err, PluginError::Validation(_)));

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("download parameters"), "{output}");
        assert!(output.contains("downloading plugin logs"), "{output}");
        assert!(!output.contains("s3cret"), "{output}");
    }

    #[test]
    fn connect_failure_is_returned() {
        let err = download_logs::<RecordingClient, _>(
            |_| Err(PluginError::Engine("unreachable".to_string())),
            request(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }
}
