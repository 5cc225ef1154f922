pub mod directory;
pub mod entrypoint;
pub mod template;

pub use directory::{parse_directory, DirectoryMapping};
pub use entrypoint::render_entrypoint;
pub use template::{render_dockerfile, Dockerfile, DockerfileTemplate};
