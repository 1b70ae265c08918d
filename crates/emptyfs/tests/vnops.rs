mod common;

use common::{CREATE_TIME, Fixture, RDEV};
use emptyfs::CURSOR_STRIDE;
use uapi::fs::{DIRENT_RECLEN, DT_DIR, Dirent};
use vfs::{
    ComponentFlags, ComponentName, FileMode, FsError, InodeType, OpenMode, ReadDirFlags, Uio,
    VnodeOps,
};

#[test]
fn test_lookup_dot_and_dotdot() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    for name in [".", ".."] {
        let found = mount.lookup(&root, &ComponentName::new(name)).unwrap();
        assert_eq!(found.vref(), root.vref());
        assert_eq!(fx.cache.iocount(root.vref()), Some(2));
        drop(found);
        assert_eq!(fx.cache.iocount(root.vref()), Some(1));
    }
}

#[test]
fn test_lookup_other_names_not_found() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    for name in ["foo", "...", ".hidden", "", "./"] {
        assert_eq!(
            mount.lookup(&root, &ComponentName::new(name)).unwrap_err(),
            FsError::NotFound
        );
    }
    assert_eq!(fx.cache.iocount(root.vref()), Some(1));
}

#[test]
fn test_lookup_uses_dotdot_flag() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    let cn = ComponentName::with_flags("..", ComponentFlags::ISLASTCN);
    assert!(!cn.is_dotdot());
    assert_eq!(mount.lookup(&root, &cn).unwrap_err(), FsError::NotFound);

    let cn = ComponentName::with_flags("..", ComponentFlags::ISDOTDOT);
    assert_eq!(mount.lookup(&root, &cn).unwrap().vref(), root.vref());
}

#[test]
fn test_open_close_always_succeed() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    mount.open(&root, OpenMode::READ).unwrap();
    mount.close(&root, OpenMode::READ).unwrap();
    mount
        .open(&root, OpenMode::READ | OpenMode::NONBLOCK | OpenMode::EVTONLY)
        .unwrap();
    // 未知位只警告
    mount.open(&root, OpenMode::from_bits_retain(0x0100_0000)).unwrap();
    mount.close(&root, OpenMode::from_bits_retain(0x0100_0001)).unwrap();
}

#[test]
fn test_getattr_root() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    let md = mount.getattr(&root).unwrap();
    assert_eq!(md.inode_no, 2);
    assert_eq!(md.inode_type, InodeType::Directory);
    assert_eq!(md.nlinks, 2);
    assert_eq!(md.size, 2 * DIRENT_RECLEN as u64);
    assert_eq!(md.rdev, 0);
    assert_eq!(md.fsid, RDEV);
    assert!(md.mode.contains(FileMode::S_IFDIR));
    assert_eq!(md.mode.permissions(), 0o555);
    assert!(!md.mode.any_write());
    assert_eq!(md.crtime, CREATE_TIME);
    assert!(md.atime.is_zero() && md.mtime.is_zero() && md.ctime.is_zero());
}

#[test]
fn test_readdir_one_record_at_a_time() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    let mut cursor = 0;
    let mut names = Vec::new();
    let mut eofs = Vec::new();
    loop {
        let mut uio = Uio::new(cursor, DIRENT_RECLEN);
        let res = mount.readdir(&root, &mut uio, ReadDirFlags::empty()).unwrap();
        if res.num_entries == 0 {
            assert!(res.eof);
            assert_eq!(uio.offset(), cursor);
            break;
        }
        assert_eq!(res.num_entries, 1);
        let d = Dirent::parse(uio.data()).unwrap();
        assert_eq!(d.d_fileno, 2);
        assert_eq!(d.d_type, DT_DIR);
        names.push(d.name().unwrap().to_string());
        eofs.push(res.eof);
        cursor = uio.offset();
        assert_eq!(cursor % CURSOR_STRIDE, 0);
    }

    assert_eq!(names, [".", ".."]);
    assert_eq!(eofs, [false, true]);
    assert_eq!(cursor, 2 * CURSOR_STRIDE);
}

#[test]
fn test_readdir_rejects_bad_input() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    let mut uio = Uio::new(0, 4096);
    assert_eq!(
        mount.readdir(&root, &mut uio, ReadDirFlags::EXTENDED),
        Err(FsError::InvalidArgument)
    );

    let mut uio = Uio::new(3, 4096);
    assert_eq!(
        mount.readdir(&root, &mut uio, ReadDirFlags::empty()),
        Err(FsError::InvalidArgument)
    );
    assert!(uio.data().is_empty());
}

#[test]
fn test_readdir_unknown_flag_bits_ignored() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap();

    let mut uio = Uio::new(0, 4096);
    let res = mount
        .readdir(&root, &mut uio, ReadDirFlags::from_bits_retain(0x40))
        .unwrap();
    assert_eq!(res.num_entries, 2);
    assert!(res.eof);
}
