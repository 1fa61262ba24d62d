pub mod kube_client;
pub mod management_client;
pub mod object_client;
pub mod resource_client;
pub mod scope;
pub mod selector;
pub mod store;

pub use management_client::{ControllerRegistry, ManagementClient};
pub use object_client::{KubeObjectClient, ObjectClient};
pub use resource_client::ResourceClient;
pub use scope::ManagedResource;
pub use selector::Selector;
pub use store::{Lister, ResourceCache};
