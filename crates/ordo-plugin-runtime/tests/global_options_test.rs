//! Process-wide option defaults
//!
//! Kept in its own test binary: it mutates global state.

use ordo_plugin_api::testing::MockFactory;
use ordo_plugin_runtime::{
    FactoryRegistry, PluginConfig, PluginManager, PluginRuntimeError, SetupOptions,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_global_options_apply_to_new_managers() {
    let before = PluginManager::with_registry(FactoryRegistry::new());

    SetupOptions::set_global(
        SetupOptions::default()
            .with_max_plugins(1)
            .with_setup_timeout(Duration::from_secs(10)),
    );

    let registry = FactoryRegistry::new();
    registry.register("a", Arc::new(MockFactory::new("log")));
    registry.register("b", Arc::new(MockFactory::new("log")));
    let after = PluginManager::with_registry(registry);

    assert_eq!(before.options(), &SetupOptions::default());
    assert_eq!(after.options().max_plugins, 1);
    assert_eq!(after.options().setup_timeout, Duration::from_secs(10));

    let config = PluginConfig::new()
        .with("log", "a", serde_json::json!({}))
        .with("log", "b", serde_json::json!({}));

    let err = after.setup_closables(&config).await.unwrap_err();
    assert!(matches!(
        err,
        PluginRuntimeError::TooManyPlugins { count: 2, max: 1 }
    ));

    // Per-manager override still wins
    let closer = after
        .with_options(SetupOptions::default())
        .setup_closables(&config)
        .await
        .unwrap();
    assert_eq!(closer.setup_order().len(), 2);
}
