pub(crate) mod network;
pub(crate) mod provisioning;
pub(crate) mod render;
pub(crate) mod sync_runtime;

pub use network::{NetworkEvent, connectivity_task, network_runner_task};
pub use provisioning::dhcp_server_task;
pub use render::render_task;
pub use sync_runtime::sync_runtime_task;
