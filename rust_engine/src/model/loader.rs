//! OBJ 网格加载器
//!
//! 相同的 (位置, UV, 法线) 组合合并为一个顶点，多边形按扇形三角化。

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use glam::{Vec2, Vec3};
use obj::ObjData;

use crate::{Result, SkinError};

use super::MeshData;

/// 从 OBJ 文件加载网格
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData> {
    let file = File::open(path.as_ref()).map_err(SkinError::Io)?;
    let mesh = parse_obj(BufReader::new(file))?;
    log::info!(
        "OBJ 加载完成: {} ({} 个顶点, {} 个三角形)",
        path.as_ref().display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// 从任意输入解析 OBJ
pub fn parse_obj<R: Read>(reader: R) -> Result<MeshData> {
    let data = ObjData::load_buf(reader)
        .map_err(|e| SkinError::MeshParse(format!("OBJ error: {}", e)))?;

    let mut mesh = MeshData::default();
    let mut unique: HashMap<(usize, Option<usize>, Option<usize>), u32> = HashMap::new();

    for object in &data.objects {
        for group in &object.groups {
            for poly in &group.polys {
                let corners = &poly.0;
                if corners.len() < 3 {
                    continue;
                }

                let mut face = Vec::with_capacity(corners.len());
                for corner in corners {
                    let key = (corner.0, corner.1, corner.2);
                    let index = match unique.get(&key) {
                        Some(&index) => index,
                        None => {
                            let index = push_vertex(&mut mesh, &data, key)?;
                            unique.insert(key, index);
                            index
                        }
                    };
                    face.push(index);
                }

                // 扇形三角化
                for i in 1..face.len() - 1 {
                    mesh.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
        }
    }

    Ok(mesh)
}

fn push_vertex(
    mesh: &mut MeshData,
    data: &ObjData,
    (position, uv, normal): (usize, Option<usize>, Option<usize>),
) -> Result<u32> {
    let p = data
        .position
        .get(position)
        .ok_or_else(|| SkinError::MeshParse(format!("position index {} out of range", position)))?;

    let uv = match uv {
        Some(i) => {
            let t = data
                .texture
                .get(i)
                .ok_or_else(|| SkinError::MeshParse(format!("uv index {} out of range", i)))?;
            Vec2::new(t[0], t[1])
        }
        None => Vec2::ZERO,
    };

    let normal = match normal {
        Some(i) => {
            let n = data
                .normal
                .get(i)
                .ok_or_else(|| SkinError::MeshParse(format!("normal index {} out of range", i)))?;
            Vec3::from_array(*n)
        }
        None => Vec3::ZERO,
    };

    let index = mesh.positions.len() as u32;
    mesh.positions.push(Vec3::from_array(*p));
    mesh.uvs.push(uv);
    mesh.normals.push(normal);
    Ok(index)
}
