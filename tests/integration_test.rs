use layout_bindings::bindings::{AttributeClassTable, HostAdapter, JsBridge, NativeAttribute};
use layout_bindings::catalog::{load_module, CORE_TYPES};
use layout_bindings::config::BridgeConfig;
use layout_bindings::native::StaticTypeTable;
use layout_bindings::version::{BuildFlags, VersionGate, VersionTriple};
use layout_bindings::{BindingError, NativeTypeId, TypeRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct GlyphInfo {
    glyph: u32,
    width: i32,
    x_offset: i32,
    y_offset: i32,
}

fn native_table() -> StaticTypeTable {
    StaticTypeTable::from_entries(
        CORE_TYPES
            .iter()
            .enumerate()
            .map(|(i, d)| (d.symbol, 0x8000 + i as u64)),
    )
}

fn all_flags() -> BuildFlags {
    BuildFlags {
        cairo: true,
        freetype: true,
    }
}

#[test]
fn test_module_load_and_round_trip() -> anyhow::Result<()> {
    let gate = VersionGate::new(VersionTriple::new(1, 12, 3));
    let module = load_module(gate, &all_flags(), &native_table())?;

    let glyph = GlyphInfo {
        glyph: 42,
        width: 1024,
        x_offset: 0,
        y_offset: -3,
    };
    let handle = module.wrap("GlyphInfo", glyph.clone())?;
    assert_eq!(module.unwrap::<GlyphInfo>("GlyphInfo", &handle)?, glyph);

    // 句柄不能被当作其他类型取出
    for other in module.registry().names() {
        if other == "GlyphInfo" {
            continue;
        }
        let err = module.unwrap::<GlyphInfo>(&other, &handle).unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { .. }), "{other}");
    }
    Ok(())
}

#[test]
fn test_version_gated_module_contents() -> anyhow::Result<()> {
    let old = load_module(
        VersionGate::new(VersionTriple::new(1, 3, 9)),
        &all_flags(),
        &native_table(),
    )?;
    assert!(!old.features().contains("script-iter"));
    assert!(old.binding("ScriptIter").is_err());

    let new = load_module(
        VersionGate::new(VersionTriple::new(1, 4, 0)),
        &all_flags(),
        &native_table(),
    )?;
    assert!(new.features().contains("script-iter"));
    assert!(new.binding("ScriptIter")?.is_resolved());
    Ok(())
}

#[test]
fn test_resolver_called_once_per_binding() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = TypeRegistry::new();
    let counter = Arc::clone(&calls);
    let binding = registry
        .register("LayoutLine", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            NativeTypeId::new(0xabc)
        })
        .unwrap();

    let ids: Vec<_> = (0..100).map(|_| registry.resolve(&binding).unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_load_exposes_nothing() {
    let partial = StaticTypeTable::from_entries(
        CORE_TYPES
            .iter()
            .filter(|d| d.name != "Coverage")
            .map(|d| (d.symbol, 7u64)),
    );
    let result = load_module(VersionGate::compiled(), &all_flags(), &partial);
    match result {
        Err(BindingError::Resolution { name, .. }) => assert_eq!(name, "Coverage"),
        other => panic!("expected resolution error, got {other:?}"),
    }
}

#[test]
fn test_script_host_flow() -> anyhow::Result<()> {
    let gate = VersionGate::new(VersionTriple::new(1, 12, 3));
    let module = load_module(gate, &all_flags(), &native_table())?;
    let js = JsBridge::new(module.gate())?;

    let handle = module.wrap("LayoutIter", 17usize)?;
    js.expose("iter", handle)?;

    let script_sees_cairo: bool = js.eval("Pango.checkVersion(1, 10, 0)")?;
    assert_eq!(script_sees_cairo, module.features().contains("cairo"));

    let back = js.fetch("iter")?;
    assert_eq!(module.unwrap::<usize>("LayoutIter", &back)?, 17);
    assert!(module.unwrap::<usize>("LayoutLine", &back).is_err());
    Ok(())
}

#[test]
fn test_attribute_classes() -> anyhow::Result<()> {
    let registry = TypeRegistry::new();
    let table = AttributeClassTable::new();
    table.add_attribute(
        1,
        registry.register("AttrLanguage", || NativeTypeId::new(0x501))?,
    )?;
    table.add_attribute(
        2,
        registry.register("AttrFamily", || NativeTypeId::new(0x502))?,
    )?;

    let family = NativeAttribute::new(2, 4, 12);
    let handle = table.make_attribute(family)?;
    assert_eq!(handle.type_name(), "AttrFamily");
    assert_eq!(table.get_attribute(&handle)?, family);
    Ok(())
}

#[test]
fn test_config_drives_gate() -> anyhow::Result<()> {
    let config = BridgeConfig::from_toml_str(
        r#"
        [version]
        override = "1.2.0"
        "#,
    )?;
    let module = load_module(config.version_gate(), &all_flags(), &native_table())?;
    assert!(!module.check_version(1, 4, 0));
    assert!(!module.registry().contains("CairoFontMap"));
    Ok(())
}
