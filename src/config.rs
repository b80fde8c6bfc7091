/// Return the first candidate variable whose value is present and non-blank
/// after trimming, otherwise the default. Candidates exist because deployed
/// `.env` files use several spellings for the same key; first match wins.
pub fn resolve<F>(lookup: &F, names: &[&str], default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    for name in names {
        if let Some(val) = lookup(name) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    default.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Cloudinary,
    Imgbb,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Cloudinary => "cloudinary",
            Provider::Imgbb => "imgbb",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailCredentials {
    pub api_key: String,
    pub domain: String,
    pub sender: String,
}

impl MailCredentials {
    /// Sending is possible only with all three of key, domain and sender.
    pub fn ready(&self) -> bool {
        !self.api_key.is_empty() && !self.domain.is_empty() && !self.sender.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub imgbb_key: String,
}

impl HostCredentials {
    pub fn cloudinary_ready(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn imgbb_ready(&self) -> bool {
        !self.imgbb_key.is_empty()
    }

    /// The single provider used for a submission: Cloudinary when its full
    /// credential set is present, imgbb as the fallback, none otherwise.
    pub fn preferred_provider(&self) -> Option<Provider> {
        if self.cloudinary_ready() {
            Some(Provider::Cloudinary)
        } else if self.imgbb_ready() {
            Some(Provider::Imgbb)
        } else {
            None
        }
    }

    pub fn folder(&self) -> Option<&str> {
        if self.folder.is_empty() {
            None
        } else {
            Some(&self.folder)
        }
    }
}

/// Process configuration, built once at startup and handed to Rocket as
/// managed state. Components never read the environment themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mail: MailCredentials,
    pub host: HostCredentials,
    pub backup_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an injected lookup so tests can pass fixture maps
    /// instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        AppConfig {
            mail: MailCredentials {
                api_key: resolve(&lookup, &["MAILGUN_API_KEY"], ""),
                domain: resolve(&lookup, &["MAILGUN_DOMAIN"], ""),
                sender: resolve(
                    &lookup,
                    &["MAILGUN_SENDER", "MAILGUN_FROM", "MAILGUN_SENDER_EMAIL"],
                    "",
                ),
            },
            host: HostCredentials {
                cloud_name: resolve(
                    &lookup,
                    &["CLOUDINARY_CLOUD_NAME", "CLOUD_NAME", "CLOUDINARY_CLOUD"],
                    "",
                ),
                api_key: resolve(&lookup, &["CLOUDINARY_API_KEY", "CLOUD_API_KEY", "API_KEY"], ""),
                api_secret: resolve(
                    &lookup,
                    &["CLOUDINARY_API_SECRET", "CLOUD_API_SECRET", "API_SECRET"],
                    "",
                ),
                folder: resolve(&lookup, &["CLOUDINARY_FOLDER", "CLOUD_FOLDER", "FOLDER"], ""),
                imgbb_key: resolve(&lookup, &["IMGBB_API_KEY", "IMG_BB_API_KEY"], ""),
            },
            backup_dir: resolve(&lookup, &["BACKUP_DIR", "BACKUP_BASE_DIR"], "backups"),
        }
    }
}
