use std::{env, io, path::PathBuf};

use anyhow::Result;

const APPLICATION_DIR: &str = "burplog";

/// Picks the directory everything lives in, either the user supplied one or
/// the platform default, and makes sure it exists.
pub fn resolve_application_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => create_dir_checked(path),
        None => create_application_default_path(),
    }
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push(APPLICATION_DIR);
            path
        }
        #[cfg(unix)]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push(APPLICATION_DIR);
            path
        }
    };

    create_dir_checked(path)
}

fn create_dir_checked(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
