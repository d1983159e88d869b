pub mod books;

use std::sync::Arc;

use inventory_kernel::ModuleRegistry;

use books::store::Connector;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, connector: Arc<dyn Connector>) {
    registry.register(books::create_module(connector));
}
