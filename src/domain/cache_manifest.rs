// Asset cache generation and manifest
use std::fmt;

/// A versioned cache store name, rendered as `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheGeneration {
    pub name: String,
    pub version: String,
}

impl CacheGeneration {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// The closed set of URLs precached for one generation.
#[derive(Debug, Clone)]
pub struct CacheManifest {
    pub generation: CacheGeneration,
    pub urls: Vec<String>,
}

impl CacheManifest {
    /// Build a manifest, resolving origin-relative asset paths against `origin`.
    /// Absolute URLs (e.g. CDN assets) are kept as-is; duplicates are dropped.
    pub fn from_assets<I, S>(generation: CacheGeneration, origin: &str, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origin = origin.trim_end_matches('/');
        let mut urls: Vec<String> = Vec::new();
        for asset in assets {
            let asset = asset.as_ref().trim();
            let url = if asset.starts_with("http://") || asset.starts_with("https://") {
                asset.to_string()
            } else {
                format!("{}/{}", origin, asset.trim_start_matches('/'))
            };
            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        Self { generation, urls }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_name() {
        assert_eq!(CacheGeneration::new("iotsync", "v1").to_string(), "iotsync@v1");
    }

    #[test]
    fn test_manifest_resolves_relative_assets() {
        let manifest = CacheManifest::from_assets(
            CacheGeneration::new("iotsync", "v1"),
            "http://localhost:3000/",
            ["/", "/app.js", "https://cdn.jsdelivr.net/npm/chart.js", "/app.js"],
        );
        assert_eq!(
            manifest.urls,
            vec![
                "http://localhost:3000/",
                "http://localhost:3000/app.js",
                "https://cdn.jsdelivr.net/npm/chart.js",
            ]
        );
    }
}
