mod common;

use std::sync::Arc;

use common::{emulated, Call, MockLight, MockMaterial, MockSurface, MockTexture};
use legacy3d_device::abi::legacy::{self, light_type, ls, rs as lrs};
use legacy3d_device::backend::TextureId;
use legacy3d_device::collab::{same_object, LightObject, MaterialObject, SurfaceObject, TextureObject};
use legacy3d_device::types::{ColorValue, LegacyLight, LegacyMaterial, Light, Material, Point};
use legacy3d_device::{DeviceError, DxVersion};

fn texture(id: u64) -> Arc<dyn TextureObject> {
    MockTexture::new(id)
}

#[test]
fn texture_handle_binds_stage_zero() {
    let mut t = emulated(DxVersion::V1);
    let tex = texture(11);
    t.device.set_texture_handle(5, Some(&tex)).unwrap();
    assert_eq!(tex.handle(), 5);

    t.device.set_render_state(lrs::TEXTUREHANDLE, 5).unwrap();
    assert_eq!(t.backend.borrow().textures.get(&0), Some(&TextureId(11)));
    assert_eq!(t.device.get_render_state(lrs::TEXTUREHANDLE).unwrap(), 5);

    t.device.set_render_state(lrs::TEXTUREHANDLE, 0).unwrap();
    assert_eq!(t.backend.borrow().textures.get(&0), None);
    assert_eq!(t.device.get_render_state(lrs::TEXTUREHANDLE).unwrap(), 0);
}

#[test]
fn unknown_texture_handle_is_ignored() {
    let mut t = emulated(DxVersion::V2);
    t.device.set_render_state(lrs::TEXTUREHANDLE, 77).unwrap();
    assert!(!t
        .backend
        .borrow()
        .calls
        .iter()
        .any(|call| matches!(call, Call::SetTexture(..))));
    assert_eq!(t.device.get_render_state(lrs::TEXTUREHANDLE).unwrap(), 0);
}

#[test]
fn handle_zero_and_missing_objects_are_rejected() {
    let mut t = emulated(DxVersion::V1);
    let tex = texture(1);
    assert_eq!(
        t.device.set_texture_handle(0, Some(&tex)),
        Err(DeviceError::InvalidParams)
    );
    assert_eq!(
        t.device.set_texture_handle(4, None),
        Err(DeviceError::InvalidParams)
    );
}

#[test]
fn swapping_twice_restores_the_original_mapping() {
    let mut t = emulated(DxVersion::V2);
    let a = texture(1);
    let b = texture(2);
    t.device.set_texture_handle(10, Some(&a)).unwrap();
    t.device.set_texture_handle(20, Some(&b)).unwrap();

    t.device.swap_texture_handles(&a, &b).unwrap();
    assert_eq!((a.handle(), b.handle()), (20, 10));
    assert!(t.device.texture_for_handle(10).is_some_and(|tex| same_object(&tex, &b)));

    t.device.swap_texture_handles(&a, &b).unwrap();
    assert_eq!((a.handle(), b.handle()), (10, 20));
    assert!(t.device.texture_for_handle(10).is_some_and(|tex| same_object(&tex, &a)));
    assert!(t.device.texture_for_handle(20).is_some_and(|tex| same_object(&tex, &b)));
}

#[test]
fn swapping_the_bound_handle_rebinds_stage_zero() {
    let mut t = emulated(DxVersion::V2);
    let a = texture(1);
    let b = texture(2);
    t.device.set_texture_handle(10, Some(&a)).unwrap();
    t.device.set_texture_handle(20, Some(&b)).unwrap();
    t.device.set_render_state(lrs::TEXTUREHANDLE, 10).unwrap();

    t.device.swap_texture_handles(&a, &b).unwrap();
    assert_eq!(t.backend.borrow().textures.get(&0), Some(&TextureId(2)));
}

#[test]
fn swapping_an_unmapped_texture_fails() {
    let mut t = emulated(DxVersion::V2);
    let a = texture(1);
    let b = texture(2);
    t.device.set_texture_handle(10, Some(&a)).unwrap();
    assert_eq!(
        t.device.swap_texture_handles(&a, &b),
        Err(DeviceError::InvalidParams)
    );
}

#[test]
fn releasing_a_texture_drops_its_handles() {
    let mut t = emulated(DxVersion::V1);
    let tex = texture(3);
    t.device.set_texture_handle(1, Some(&tex)).unwrap();
    t.device.set_texture_handle(2, Some(&tex)).unwrap();
    t.device.release_texture_handle(&tex);
    assert!(t.device.texture_for_handle(1).is_none());
    assert!(t.device.texture_for_handle(2).is_none());
}

#[test]
fn releasing_the_bound_texture_clears_the_handle_state() {
    let mut t = emulated(DxVersion::V1);
    let bound = texture(3);
    let other = texture(4);
    t.device.set_texture_handle(1, Some(&bound)).unwrap();
    t.device.set_texture_handle(2, Some(&other)).unwrap();
    t.device.set_render_state(lrs::TEXTUREHANDLE, 1).unwrap();

    t.device.release_texture_handle(&other);
    assert_eq!(t.device.get_render_state(lrs::TEXTUREHANDLE).unwrap(), 1);

    t.device.release_texture_handle(&bound);
    assert_eq!(t.device.get_render_state(lrs::TEXTUREHANDLE).unwrap(), 0);
}

#[test]
fn texture_without_backend_resource_fails_generically() {
    let mut t = emulated(DxVersion::V3);
    let surface: Arc<dyn SurfaceObject> = Arc::new(MockSurface::default());
    assert_eq!(t.device.set_texture(0, Some(&surface)), Err(DeviceError::Generic));
    assert_eq!(t.device.set_texture(8, None), Err(DeviceError::InvalidParams));
}

#[test]
fn bound_textures_are_reported_back() {
    let mut t = emulated(DxVersion::V7);
    let surface: Arc<dyn SurfaceObject> = MockSurface::with_texture(8);
    t.device.set_texture(2, Some(&surface)).unwrap();
    let bound = t.device.get_texture(2, DxVersion::V7).unwrap();
    assert!(bound.is_some_and(|s| same_object(&s, &surface)));
    assert!(t.device.get_texture(3, DxVersion::V7).unwrap().is_none());
}

#[test]
fn material_light_state_applies_material_and_its_texture() {
    let mut t = emulated(DxVersion::V3);
    let tex = texture(40);
    t.device.set_texture_handle(3, Some(&tex)).unwrap();

    let red = ColorValue {
        r: 1.0,
        a: 1.0,
        ..Default::default()
    };
    let material: Arc<dyn MaterialObject> = Arc::new(MockMaterial(LegacyMaterial {
        diffuse: red,
        power: 4.0,
        texture_handle: 3,
        ..Default::default()
    }));
    t.device.set_material_handle(9, Some(&material)).unwrap();

    t.device.set_light_state(ls::MATERIAL, 9).unwrap();
    {
        let backend = t.backend.borrow();
        assert_eq!(backend.material.diffuse, red);
        assert_eq!(backend.material.power, 4.0);
        assert_eq!(backend.textures.get(&0), Some(&TextureId(40)));
    }
    assert_eq!(t.device.get_light_state(ls::MATERIAL).unwrap(), 9);

    t.device.set_light_state(ls::MATERIAL, 0).unwrap();
    assert_eq!(t.backend.borrow().material, Material::default());
    assert_eq!(t.device.get_light_state(ls::MATERIAL).unwrap(), 0);
}

#[test]
fn unknown_material_handle_is_ignored() {
    let mut t = emulated(DxVersion::V2);
    t.device.set_light_state(ls::MATERIAL, 12).unwrap();
    assert_eq!(t.device.get_light_state(ls::MATERIAL).unwrap(), 0);
}

fn point_light(flags: u32) -> LegacyLight {
    LegacyLight {
        size: LegacyLight::SIZE_V2,
        light_type: light_type::POINT,
        color: ColorValue {
            r: 0.5,
            g: 0.5,
            b: 0.5,
            a: 1.0,
        },
        range: 100.0,
        flags,
        ..Default::default()
    }
}

#[test]
fn light_objects_keep_their_index() {
    let mut t = emulated(DxVersion::V3);
    let first: Arc<dyn LightObject> = Arc::new(MockLight);
    let second: Arc<dyn LightObject> = Arc::new(MockLight);

    t.device
        .set_light_object(&first, &point_light(legacy::LIGHT_ACTIVE))
        .unwrap();
    t.device.set_light_object(&second, &point_light(0)).unwrap();
    let index = t.device.light_index(&first).expect("first light mapped");
    let other = t.device.light_index(&second).expect("second light mapped");
    assert_ne!(index, other);

    t.device
        .set_light_object(&first, &point_light(legacy::LIGHT_ACTIVE))
        .unwrap();
    assert_eq!(t.device.light_index(&first), Some(index));

    assert!(t.device.get_light_enable_object(&first).unwrap());
    assert!(!t.device.get_light_enable_object(&second).unwrap());

    t.device.light_enable_object(&second, true).unwrap();
    assert!(t.device.get_light_enable(other).unwrap());
}

#[test]
fn released_light_is_switched_off_and_its_index_reused() {
    let mut t = emulated(DxVersion::V2);
    let first: Arc<dyn LightObject> = Arc::new(MockLight);
    t.device
        .set_light_object(&first, &point_light(legacy::LIGHT_ACTIVE))
        .unwrap();
    let index = t.device.light_index(&first).unwrap();

    t.device.release_light_interface(&first);
    assert_eq!(t.device.light_index(&first), None);
    assert_eq!(t.backend.borrow().light_enabled.get(&index), Some(&false));
    assert_eq!(
        t.device.light_enable_object(&first, true),
        Err(DeviceError::InvalidParams)
    );

    let next: Arc<dyn LightObject> = Arc::new(MockLight);
    t.device.set_light_object(&next, &point_light(0)).unwrap();
    assert_eq!(t.device.light_index(&next), Some(index));
}

#[test]
fn light_with_invalid_size_is_rejected() {
    let mut t = emulated(DxVersion::V1);
    let light: Arc<dyn LightObject> = Arc::new(MockLight);
    let data = LegacyLight {
        size: 12,
        ..point_light(0)
    };
    assert_eq!(
        t.device.set_light_object(&light, &data),
        Err(DeviceError::InvalidParams)
    );
    assert_eq!(t.device.light_index(&light), None);
}

#[test]
fn no_specular_flag_reaches_the_backend() {
    let mut t = emulated(DxVersion::V3);
    let light: Arc<dyn LightObject> = Arc::new(MockLight);
    t.device
        .set_light_object(
            &light,
            &point_light(legacy::LIGHT_ACTIVE | legacy::LIGHT_NO_SPECULAR),
        )
        .unwrap();
    let index = t.device.light_index(&light).unwrap();
    let stored = t.device.get_light(index).unwrap();
    assert_eq!(stored.specular, ColorValue::default());
    assert_eq!(stored.diffuse.r, 0.5);
}

#[test]
fn spot_inner_cone_is_narrowed_unless_narrower_than_outer() {
    let mut t = emulated(DxVersion::V7);
    let spot = Light {
        light_type: light_type::SPOT,
        theta: 0.7,
        phi: 0.7,
        ..Default::default()
    };
    t.device.set_light(0, &spot).unwrap();
    let stored = t.device.get_light(0).unwrap();
    assert!((stored.theta - 0.4).abs() < 1e-6);
    assert_eq!(stored.phi, 0.7);

    let inside = Light {
        theta: 0.2,
        ..spot
    };
    t.device.set_light(1, &inside).unwrap();
    assert!((t.device.get_light(1).unwrap().theta - 0.2 / 1.75).abs() < 1e-6);

    let wider = Light {
        theta: 0.9,
        ..spot
    };
    t.device.set_light(2, &wider).unwrap();
    assert_eq!(t.device.get_light(2).unwrap().theta, 0.9);
}

#[test]
fn unsupported_light_types_are_dropped() {
    let mut t = emulated(DxVersion::V2);
    let light = Light {
        light_type: light_type::PARALLELPOINT,
        ..Default::default()
    };
    t.device.set_light(4, &light).unwrap();
    assert!(t.device.get_light(4).is_err());
}

#[test]
fn render_target_changes_only_when_the_surface_differs() {
    let mut t = emulated(DxVersion::V7);
    let initial: Arc<dyn SurfaceObject> = MockSurface::with_texture(1);
    *t.parent.render_target.borrow_mut() = Some(Arc::clone(&initial));
    let current = t.device.get_render_target(DxVersion::V7).unwrap();
    assert!(same_object(&current, &initial));

    let target: Arc<dyn SurfaceObject> = MockSurface::with_texture(2);
    t.device.set_render_target(&target).unwrap();
    t.device.set_render_target(&target).unwrap();
    assert_eq!(t.parent.target_changes.get(), 1);
    let current = t.device.get_render_target(DxVersion::V7).unwrap();
    assert!(same_object(&current, &target));
}

#[test]
fn load_copies_between_surfaces() {
    let mut t = emulated(DxVersion::V7);
    let dest = MockSurface::with_texture(1);
    let src: Arc<dyn SurfaceObject> = MockSurface::with_texture(2);
    let dest_dyn: Arc<dyn SurfaceObject> = dest.clone();
    t.device.pre_load(&dest_dyn).unwrap();
    t.device
        .load(&dest_dyn, Point::default(), &src, None, 0)
        .unwrap();
    assert_eq!(dest.loads.get(), 1);
}
