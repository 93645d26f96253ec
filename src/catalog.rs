//! 类型目录与模块加载
//!
//! 定义暴露给宿主的原生结构体及其内省符号，并在模块加载时：
//! 1. 组合条件能力（版本门 + 构建标志）
//! 2. 为每个存在的类型注册绑定
//! 3. 立即解析全部绑定，任何失败都中止加载
//! 4. 封存注册表

use std::sync::Arc;

use crate::bindings::{AttributeClassTable, HostHandle};
use crate::config::BridgeConfig;
use crate::core::{BindingError, BindingResult};
use crate::native::{NativeLibrary, ResolverSource};
use crate::registry::{TypeBinding, TypeRegistry};
use crate::version::{BuildFlag, BuildFlags, ConditionalFeature, FeatureSet, VersionGate, VersionTriple};

/// 目录条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// 宿主可见的符号名
    pub name: &'static str,
    /// 原生内省入口
    pub symbol: &'static str,
    /// 门控能力，`None` 表示总是存在
    pub feature: Option<&'static str>,
}

pub const FEATURE_SCRIPT_ITER: &str = "script-iter";
pub const FEATURE_CAIRO: &str = "cairo";
pub const FEATURE_FREETYPE: &str = "freetype";

/// 原生库的可选能力
pub const CONDITIONAL_FEATURES: &[ConditionalFeature] = &[
    ConditionalFeature::new(FEATURE_SCRIPT_ITER, VersionTriple::new(1, 4, 0)),
    ConditionalFeature::new(FEATURE_CAIRO, VersionTriple::new(1, 10, 0)).with_flag(BuildFlag::Cairo),
    ConditionalFeature::new(FEATURE_FREETYPE, VersionTriple::new(0, 0, 0)).with_flag(BuildFlag::Freetype),
];

/// 标准类型目录
pub const CORE_TYPES: &[TypeDescriptor] = type_descriptors![
    Item => "pango_item_get_type",
    Analysis => "pango_analysis_get_type",
    LogAttr => "pango_log_attr_get_type",
    LayoutIter => "pango_layout_iter_get_type",
    LayoutLine => "pango_layout_line_get_type",
    Rectangle => "pango_rectangle_get_type",
    AttrIterator => "pango_attr_iter_get_type",
    Coverage => "pango_coverage_get_type",
    GlyphInfo => "pango_glyph_info_get_type",
    GlyphItem => "pango_glyph_item_get_type",
    ScriptIter => "pango_script_iter_get_type" ; feature "script-iter",
    CairoFontMap => "pango_cairo_font_map_get_type" ; feature "cairo",
    FcFont => "pango_fc_font_get_type" ; feature "freetype",
];

/// 已加载的绑定模块
///
/// 只有在全部绑定解析成功后才会构造出来。
pub struct LoadedModule {
    gate: VersionGate,
    features: FeatureSet,
    registry: TypeRegistry,
    attributes: AttributeClassTable,
}

impl LoadedModule {
    pub fn gate(&self) -> VersionGate {
        self.gate
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn attributes(&self) -> &AttributeClassTable {
        &self.attributes
    }

    pub fn check_version(&self, major: u32, minor: u32, micro: u32) -> bool {
        self.gate.at_least(major, minor, micro)
    }

    /// 按名称查找绑定
    pub fn binding(&self, name: &str) -> BindingResult<Arc<TypeBinding>> {
        self.registry.get(name).ok_or_else(|| {
            BindingError::Configuration(format!("Type `{}` is not exposed by this module", name))
        })
    }

    pub fn wrap<T>(&self, name: &str, value: T) -> BindingResult<HostHandle>
    where
        T: std::any::Any + Send + Sync,
    {
        self.binding(name)?.wrap(value)
    }

    pub fn unwrap<T>(&self, name: &str, handle: &HostHandle) -> BindingResult<T>
    where
        T: std::any::Any + Clone,
    {
        self.binding(name)?.unwrap(handle)
    }

    /// 按配置打开原生库并加载模块
    pub fn from_config(config: &BridgeConfig) -> BindingResult<Self> {
        let path = config.library.path.as_ref().ok_or_else(|| {
            BindingError::Configuration("No native library path configured".to_string())
        })?;
        let library = NativeLibrary::open(path)?;

        let gate = config.version_gate();
        if let Some(runtime) = library.runtime_version() {
            if runtime != gate.version() {
                tracing::warn!(
                    target: "catalog",
                    "Native library reports {} but bindings are gated at {}",
                    runtime,
                    gate.version()
                );
            }
        }

        load_module(gate, &config.library.build_flags, &library)
    }
}

impl std::fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("gate", &self.gate)
            .field("features", &self.features)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// 使用标准类型目录加载模块
pub fn load_module(
    gate: VersionGate,
    flags: &BuildFlags,
    source: &dyn ResolverSource,
) -> BindingResult<LoadedModule> {
    load_catalog(gate, flags, source, CORE_TYPES)
}

/// 使用给定目录加载模块
pub fn load_catalog(
    gate: VersionGate,
    flags: &BuildFlags,
    source: &dyn ResolverSource,
    descriptors: &[TypeDescriptor],
) -> BindingResult<LoadedModule> {
    let features = FeatureSet::compose(&gate, flags, CONDITIONAL_FEATURES);
    let registry = TypeRegistry::new();

    for descriptor in descriptors {
        if let Some(feature) = descriptor.feature {
            if !CONDITIONAL_FEATURES.iter().any(|f| f.name == feature) {
                return Err(BindingError::Configuration(format!(
                    "Type `{}` is gated by unknown feature `{}`",
                    descriptor.name, feature
                )));
            }
            if !features.contains(feature) {
                continue;
            }
        }
        registry.register_shared(descriptor.name, source.resolver_for(descriptor.symbol))?;
    }

    registry.resolve_all().map_err(|e| {
        tracing::error!(target: "catalog", "Module load aborted: {}", e);
        e
    })?;
    registry.seal();

    tracing::info!(
        target: "catalog",
        "Loaded {} type bindings for library {} (features: {:?})",
        registry.len(),
        gate.version(),
        features.names()
    );

    Ok(LoadedModule {
        gate,
        features,
        registry,
        attributes: AttributeClassTable::new(),
    })
}
