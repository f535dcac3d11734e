//! Virtools class-id registry (`CKCID_*`).

use std::borrow::Cow;

/// Canonical name for a known class id, `None` otherwise.
pub fn known_class_name(class_id: i32) -> Option<&'static str> {
    Some(match class_id {
        1  => "OBJECT",
        2  => "PARAMETERIN",
        3  => "PARAMETEROUT",
        4  => "PARAMETEROPERATION",
        5  => "STATE",
        6  => "BEHAVIORLINK",
        8  => "BEHAVIOR",
        9  => "BEHAVIORIO",
        10 => "SCENE",
        11 => "SCENEOBJECT",
        12 => "RENDERCONTEXT",
        13 => "KINEMATICCHAIN",
        15 => "OBJECTANIMATION",
        16 => "ANIMATION",
        18 => "KEYEDANIMATION",
        19 => "BEOBJECT",
        20 => "SYNCHRO",
        21 => "LEVEL",
        22 => "PLACE",
        23 => "GROUP",
        24 => "SOUND",
        25 => "WAVESOUND",
        26 => "MIDISOUND",
        27 => "ENTITY_2D",
        28 => "SPRITE",
        29 => "SPRITETEXT",
        30 => "MATERIAL",
        31 => "TEXTURE",
        32 => "MESH",
        33 => "ENTITY_3D",
        34 => "CAMERA",
        35 => "TARGETCAMERA",
        36 => "CURVEPOINT",
        37 => "SPRITE3D",
        38 => "LIGHT",
        39 => "TARGETLIGHT",
        40 => "CHARACTER",
        41 => "OBJECT_3D",
        42 => "BODYPART",
        43 => "CURVE",
        45 => "PARAMETERLOCAL",
        46 => "PARAMETER",
        47 => "RENDEROBJECT",
        48 => "INTERFACEOBJECTMANAGER",
        49 => "CRITICALSECTION",
        50 => "GRID",
        51 => "LAYER",
        52 => "DATAARRAY",
        53 => "PATCHMESH",
        54 => "PROGRESSIVEMESH",
        55 => "PARAMETERVARIABLE",
        56 => "POINTCLOUD_3D",
        57 => "VIDEO",
        58 => "MAXCLASSID",
        80 => "OBJECTARRAY",
        81 => "SCENEOBJECTDESC",
        82 => "ATTRIBUTEMANAGER",
        83 => "MESSAGEMANAGER",
        84 => "COLLISIONMANAGER",
        85 => "OBJECTMANAGER",
        86 => "FLOORMANAGER",
        87 => "RENDERMANAGER",
        88 => "BEHAVIORMANAGER",
        89 => "INPUTMANAGER",
        90 => "PARAMETERMANAGER",
        91 => "GRIDMANAGER",
        92 => "SOUNDMANAGER",
        93 => "TIMEMANAGER",
        94 => "VIDEOMANAGER",
        -1 => "CUIKBEHDATA",
        _  => return None,
    })
}

/// Total mapping: unknown ids render as `TYPE_<id>`.
pub fn class_name(class_id: i32) -> Cow<'static, str> {
    match known_class_name(class_id) {
        Some(name) => Cow::Borrowed(name),
        None       => Cow::Owned(format!("TYPE_{class_id}")),
    }
}
