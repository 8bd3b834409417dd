//! Subcommand implementations.
//!
//! Each module exposes clap `Args` structs plus free `run`-shaped functions
//! taking `(&Factory, args)`, so tests drive them directly with a test
//! factory and buffered streams.

pub mod config;
pub mod container;
pub mod image;
pub mod init;
pub mod monitor;
pub mod project;
pub mod ralph;
pub mod version;
pub mod worktree;

#[cfg(test)]
pub(crate) mod testutil {
    use async_trait::async_trait;
    use clawker_core::client::{
        BuildOptions, BuildProgress, ClientError, ContainerClient, ContainerSummary,
        CreateOptions, ImageSummary,
    };
    use std::sync::Mutex;

    /// Serializes `CLAWKER_HOME` mutation across command tests.
    pub static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// In-memory runtime standing in for the docker driver.
    pub struct FakeClient {
        pub containers: Mutex<Vec<ContainerSummary>>,
        pub images: Mutex<Vec<ImageSummary>>,
        pub build_steps: u64,
    }

    impl FakeClient {
        pub fn new() -> Self {
            Self {
                containers: Mutex::new(Vec::new()),
                images: Mutex::new(Vec::new()),
                build_steps: 4,
            }
        }

        pub fn with_container(self, name: &str, state: &str) -> Self {
            self.containers.lock().unwrap().push(ContainerSummary {
                id: format!("id-{name}"),
                name: name.to_string(),
                image: "clawker/agent:latest".to_string(),
                state: state.to_string(),
                status: format!("{state} just now"),
            });
            self
        }

        pub fn with_image(self, reference: &str) -> Self {
            self.images.lock().unwrap().push(ImageSummary {
                id: format!("sha256:{reference}"),
                reference: reference.to_string(),
                size: "120MB".to_string(),
                created: "2 days ago".to_string(),
            });
            self
        }

        fn set_state(&self, name: &str, state: &str) -> Result<(), ClientError> {
            let mut containers = self.containers.lock().unwrap();
            match containers.iter_mut().find(|c| c.name == name) {
                Some(c) => {
                    c.state = state.to_string();
                    Ok(())
                }
                None => Err(ClientError::NotFound {
                    kind: "container",
                    name: name.to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl ContainerClient for FakeClient {
        async fn ping(&self) -> Result<String, ClientError> {
            Ok("fake-runtime 1.0".to_string())
        }

        async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ClientError> {
            Ok(self.containers.lock().unwrap().clone())
        }

        async fn inspect_container(&self, name: &str) -> Result<serde_json::Value, ClientError> {
            let containers = self.containers.lock().unwrap();
            containers
                .iter()
                .find(|c| c.name == name)
                .map(|c| serde_json::json!({ "Id": c.id, "Name": c.name, "State": c.state }))
                .ok_or_else(|| ClientError::NotFound {
                    kind: "container",
                    name: name.to_string(),
                })
        }

        async fn create_container(&self, opts: &CreateOptions) -> Result<String, ClientError> {
            let id = format!("id-{}", opts.name);
            self.containers.lock().unwrap().push(ContainerSummary {
                id: id.clone(),
                name: opts.name.clone(),
                image: opts.image.clone(),
                state: "created".to_string(),
                status: "Created".to_string(),
            });
            Ok(id)
        }

        async fn start_container(&self, name: &str) -> Result<(), ClientError> {
            self.set_state(name, "running")
        }

        async fn stop_container(&self, name: &str) -> Result<(), ClientError> {
            self.set_state(name, "exited")
        }

        async fn pause_container(&self, name: &str) -> Result<(), ClientError> {
            self.set_state(name, "paused")
        }

        async fn unpause_container(&self, name: &str) -> Result<(), ClientError> {
            self.set_state(name, "running")
        }

        async fn remove_container(&self, name: &str, _force: bool) -> Result<(), ClientError> {
            let mut containers = self.containers.lock().unwrap();
            let before = containers.len();
            containers.retain(|c| c.name != name);
            if containers.len() == before {
                return Err(ClientError::NotFound {
                    kind: "container",
                    name: name.to_string(),
                });
            }
            Ok(())
        }

        async fn list_images(&self) -> Result<Vec<ImageSummary>, ClientError> {
            Ok(self.images.lock().unwrap().clone())
        }

        async fn inspect_image(&self, reference: &str) -> Result<serde_json::Value, ClientError> {
            let images = self.images.lock().unwrap();
            images
                .iter()
                .find(|i| i.reference == reference)
                .map(|i| serde_json::json!({ "Id": i.id, "RepoTags": [i.reference] }))
                .ok_or_else(|| ClientError::NotFound {
                    kind: "image",
                    name: reference.to_string(),
                })
        }

        async fn build_image(
            &self,
            opts: &BuildOptions,
            progress: BuildProgress<'_>,
        ) -> Result<String, ClientError> {
            for step in 1..=self.build_steps {
                progress(step, self.build_steps);
            }
            self.images.lock().unwrap().push(ImageSummary {
                id: "sha256:built".to_string(),
                reference: opts.tag.clone(),
                size: "100MB".to_string(),
                created: "now".to_string(),
            });
            Ok("sha256:built".to_string())
        }

        async fn remove_image(&self, reference: &str, _force: bool) -> Result<(), ClientError> {
            let mut images = self.images.lock().unwrap();
            let before = images.len();
            images.retain(|i| i.reference != reference);
            if images.len() == before {
                return Err(ClientError::NotFound {
                    kind: "image",
                    name: reference.to_string(),
                });
            }
            Ok(())
        }
    }
}
