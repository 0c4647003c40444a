use crate::env::EwEnvironment;
use crate::error::{Result, TankplayError};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// How to start one `tankplayer` process.
#[derive(Debug, Clone)]
pub struct PlayerCommand {
    pub binary: PathBuf,
    pub env: EwEnvironment,
}

impl PlayerCommand {
    pub fn new(binary: impl Into<PathBuf>, env: EwEnvironment) -> Self {
        Self {
            binary: binary.into(),
            env,
        }
    }

    pub fn command(&self, config_file: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(config_file);
        self.env.apply(&mut cmd);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Play `config_file` and block until the player exits.
    pub fn run(&self, config_file: &Path) -> Result<ExitStatus> {
        let mut child = self
            .command(config_file)
            .spawn()
            .map_err(|source| TankplayError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;
        tracing::debug!(pid = child.id(), config = %config_file.display(), "tankplayer started");
        Ok(child.wait()?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn env(dir: &Path) -> EwEnvironment {
        EwEnvironment {
            params: dir.join("params"),
            installation: "INST_TEST".into(),
            log: dir.join("logs"),
        }
    }

    #[test]
    fn player_receives_config_and_environment() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("seen");
        let script = dir.path().join("tankplayer");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$1 $EW_INSTALLATION\" > {}\n",
                out.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let player = PlayerCommand::new(&script, env(dir.path()));
        let status = player.run(Path::new("tankplayer.d.seismic")).unwrap();
        assert!(status.success());
        assert_eq!(
            std::fs::read_to_string(&out).unwrap().trim(),
            "tankplayer.d.seismic INST_TEST"
        );
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("tankplayer");
        std::fs::write(&script, "#!/bin/sh\nexit 4\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let status = PlayerCommand::new(&script, env(dir.path()))
            .run(Path::new("cfg"))
            .unwrap();
        assert_eq!(status.code(), Some(4));
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let err = PlayerCommand::new(dir.path().join("absent"), env(dir.path()))
            .run(Path::new("cfg"))
            .unwrap_err();
        assert!(matches!(err, TankplayError::Spawn { .. }));
    }
}
