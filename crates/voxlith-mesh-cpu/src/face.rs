use voxlith_geom::Vec3;
use voxlith_voxel::FaceRole;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// The four lateral faces, in draw-table order.
    pub const SIDES: [Face; 4] = [Face::PosX, Face::NegX, Face::PosZ, Face::NegZ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            0 => Face::PosY,
            1 => Face::NegY,
            2 => Face::PosX,
            3 => Face::NegX,
            4 => Face::PosZ,
            5 => Face::NegZ,
            _ => Face::PosY,
        }
    }

    /// Index into `SIDES`, or `None` for top and bottom.
    #[inline]
    pub fn side_index(self) -> Option<usize> {
        match self {
            Face::PosX => Some(0),
            Face::NegX => Some(1),
            Face::PosZ => Some(2),
            Face::NegZ => Some(3),
            Face::PosY | Face::NegY => None,
        }
    }

    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    #[inline]
    pub fn role(self) -> FaceRole {
        match self {
            Face::PosY => FaceRole::Top,
            Face::NegY => FaceRole::Bottom,
            _ => FaceRole::Side,
        }
    }

    /// Unit-cube corners of the face, counter-clockwise seen from outside.
    #[inline]
    pub fn corners(self) -> [[usize; 3]; 4] {
        match self {
            Face::PosY => [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]],
            Face::NegY => [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
            Face::PosX => [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
            Face::NegX => [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
            Face::PosZ => [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
            Face::NegZ => [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
        }
    }

    /// For a side face: pairs of `(mine, neighbor)` top corners `(dx,dz)` that
    /// touch across the face.
    pub fn shared_top_corners(self) -> [([usize; 2], [usize; 2]); 2] {
        match self {
            Face::PosX => [([1, 0], [0, 0]), ([1, 1], [0, 1])],
            Face::NegX => [([0, 0], [1, 0]), ([0, 1], [1, 1])],
            Face::PosZ => [([0, 1], [0, 0]), ([1, 1], [1, 0])],
            Face::NegZ => [([0, 0], [0, 1]), ([1, 0], [1, 1])],
            Face::PosY | Face::NegY => [([0, 0], [0, 0]); 2],
        }
    }
}
