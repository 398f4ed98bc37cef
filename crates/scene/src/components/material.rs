use foundation::ids::ResourceId;

/// Fragment program selector. The numeric value is what the shader sees.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Diffuse lit by the key light, optional normal map.
    Lit,
    /// Emissive map visible only on the unlit hemisphere.
    NightLights,
    /// Map luminance drives alpha.
    Clouds,
    /// Fresnel rim glow.
    Atmosphere,
    Unlit,
    /// Camera-facing star billboards.
    Stars,
}

impl Shading {
    pub fn mode(self) -> u32 {
        match self {
            Shading::Lit => 0,
            Shading::NightLights => 1,
            Shading::Clouds => 2,
            Shading::Atmosphere => 3,
            Shading::Unlit => 4,
            Shading::Stars => 5,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Opaque,
    Alpha,
    Additive,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Texture slot of a material that can be swapped after creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MapSlot {
    Color,
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: [f32; 4],
    pub opacity: f32,
    pub map: Option<ResourceId>,
    pub normal_map: Option<ResourceId>,
    pub blend: BlendMode,
    pub side: Side,
    pub depth_write: bool,
}

impl Material {
    fn base(shading: Shading, blend: BlendMode) -> Self {
        Self {
            shading,
            color: [1.0, 1.0, 1.0, 1.0],
            opacity: 1.0,
            map: None,
            normal_map: None,
            blend,
            side: Side::Front,
            depth_write: blend == BlendMode::Opaque,
        }
    }

    pub fn lit(map: ResourceId) -> Self {
        Self {
            map: Some(map),
            ..Self::base(Shading::Lit, BlendMode::Opaque)
        }
    }

    /// Lit with a flat color and no map.
    pub fn solid(color: [f32; 4]) -> Self {
        Self {
            color,
            ..Self::base(Shading::Lit, BlendMode::Opaque)
        }
    }

    pub fn night_lights(map: ResourceId) -> Self {
        Self {
            map: Some(map),
            ..Self::base(Shading::NightLights, BlendMode::Additive)
        }
    }

    pub fn clouds(map: ResourceId) -> Self {
        Self {
            map: Some(map),
            opacity: 0.85,
            ..Self::base(Shading::Clouds, BlendMode::Alpha)
        }
    }

    pub fn atmosphere(color: [f32; 4]) -> Self {
        Self {
            color,
            side: Side::Back,
            ..Self::base(Shading::Atmosphere, BlendMode::Additive)
        }
    }

    pub fn unlit(color: [f32; 4]) -> Self {
        Self {
            color,
            ..Self::base(Shading::Unlit, BlendMode::Opaque)
        }
    }

    /// Inside-out textured shell, drawn behind everything.
    pub fn backdrop(map: ResourceId) -> Self {
        Self {
            map: Some(map),
            side: Side::Back,
            depth_write: false,
            ..Self::base(Shading::Unlit, BlendMode::Opaque)
        }
    }

    pub fn stars() -> Self {
        Self::base(Shading::Stars, BlendMode::Additive)
    }

    pub fn glow(color: [f32; 4]) -> Self {
        Self {
            color,
            ..Self::base(Shading::Unlit, BlendMode::Additive)
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn slot(&self, slot: MapSlot) -> Option<ResourceId> {
        match slot {
            MapSlot::Color => self.map,
            MapSlot::Normal => self.normal_map,
        }
    }

    pub fn set_slot(&mut self, slot: MapSlot, texture: Option<ResourceId>) -> Option<ResourceId> {
        match slot {
            MapSlot::Color => std::mem::replace(&mut self.map, texture),
            MapSlot::Normal => std::mem::replace(&mut self.normal_map, texture),
        }
    }

    pub fn textures(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.map.iter().chain(self.normal_map.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::ids::{ResourceId, ResourceKind};

    #[test]
    fn transparent_materials_skip_depth_writes() {
        let tex = ResourceId::new(ResourceKind::Texture, 0);
        assert!(Material::lit(tex).depth_write);
        assert!(!Material::clouds(tex).depth_write);
        assert!(!Material::stars().depth_write);
        assert_eq!(Material::atmosphere([0.3, 0.6, 1.0, 1.0]).side, Side::Back);
    }

    #[test]
    fn set_slot_returns_previous() {
        let a = ResourceId::new(ResourceKind::Texture, 1);
        let b = ResourceId::new(ResourceKind::Texture, 2);
        let mut m = Material::lit(a);
        assert_eq!(m.set_slot(MapSlot::Color, Some(b)), Some(a));
        assert_eq!(m.set_slot(MapSlot::Normal, Some(a)), None);
        assert_eq!(m.textures().collect::<Vec<_>>(), vec![b, a]);
    }
}
