mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{Fixture, wait_for_slot};
use vfs::{FsError, InodeType, VnodeCreateFlags, VnodeId, VnodeOps, VnodeRef};

#[test]
fn test_root_created_lazily_once() {
    let fx = Fixture::new();
    let mount = fx.mount();
    assert!(mount.root_snapshot().is_idle());
    assert_eq!(fx.cache.create_calls(), 0);

    let first = mount.root_vnode().unwrap();
    let root = first.vref();
    assert_eq!(mount.root_snapshot().vnode, Some(root));
    assert!(fx.cache.has_fs_ref(root));
    assert_eq!(fx.cache.iocount(root), Some(1));

    let second = mount.root_vnode().unwrap();
    assert_eq!(second.vref(), root);
    assert_eq!(fx.cache.iocount(root), Some(2));
    assert_eq!(fx.cache.create_calls(), 1);

    drop(first);
    drop(second);
    assert_eq!(fx.cache.iocount(root), Some(0));
    assert_eq!(mount.root_snapshot().vnode, Some(root));
}

#[test]
fn test_root_create_params() {
    let fx = Fixture::new();
    let mount = fx.mount();
    drop(mount.root_vnode().unwrap());

    let creates = fx.cache.creates();
    assert_eq!(creates.len(), 1);
    let params = &creates[0];
    assert_eq!(params.mount, mount.id());
    assert_eq!(params.vtype, InodeType::Directory);
    assert!(params.is_root);
    assert!(!params.is_system);
    assert_eq!(params.rdev, 0);
    assert_eq!(params.file_size, 0);
    assert_eq!(
        params.flags,
        VnodeCreateFlags::NOCACHE | VnodeCreateFlags::CANTCACHE
    );
}

#[test]
fn test_concurrent_get_constructs_once() {
    const THREADS: usize = 8;

    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.set_create_delay(Some(Duration::from_millis(20)));

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let mount = mount.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                mount.root_vnode().map(|vn| vn.vref())
            })
        })
        .collect();

    let refs: Vec<VnodeRef> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(fx.cache.create_calls(), 1);
    assert!(refs.iter().all(|r| *r == refs[0]));
    assert_eq!(fx.cache.iocount(refs[0]), Some(0));

    let snap = mount.root_snapshot();
    assert!(!snap.attaching && !snap.waiting);
    assert_eq!(snap.vnode, Some(refs[0]));
}

#[test]
fn test_waiting_flag_while_attaching() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.pause_create();

    let builder = {
        let mount = mount.clone();
        thread::spawn(move || mount.root_vnode().map(|vn| vn.vref()))
    };
    fx.cache.wait_create_entered(1);

    let snap = mount.root_snapshot();
    assert!(snap.attaching);
    assert!(!snap.waiting);
    assert_eq!(snap.vnode, None);

    let waiter = {
        let mount = mount.clone();
        thread::spawn(move || mount.root_vnode().map(|vn| vn.vref()))
    };
    wait_for_slot(&mount, "waiting flag", |s| s.waiting);
    assert!(mount.root_snapshot().attaching);

    fx.cache.resume_create();
    let built = builder.join().unwrap().unwrap();
    let waited = waiter.join().unwrap().unwrap();

    assert_eq!(built, waited);
    assert_eq!(fx.cache.create_calls(), 1);
    let snap = mount.root_snapshot();
    assert!(!snap.attaching && !snap.waiting);
}

#[test]
fn test_construction_failure_reported_to_one_caller() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.pause_create();
    fx.cache.fail_next_create(FsError::NoMemory);

    let builder = {
        let mount = mount.clone();
        thread::spawn(move || mount.root_vnode().map(|vn| vn.vref()))
    };
    fx.cache.wait_create_entered(1);

    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let mount = mount.clone();
            thread::spawn(move || mount.root_vnode().map(|vn| vn.vref()))
        })
        .collect();
    wait_for_slot(&mount, "waiters", |s| s.waiting);

    fx.cache.resume_create();

    assert_eq!(builder.join().unwrap(), Err(FsError::NoMemory));
    let refs: Vec<VnodeRef> = waiters
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(refs[0], refs[1]);

    // 失败一次，随后某个等待者重新构造成功
    assert_eq!(fx.cache.create_calls(), 2);
    let snap = mount.root_snapshot();
    assert!(!snap.attaching && !snap.waiting);
    assert_eq!(snap.vnode, Some(refs[0]));
}

#[test]
fn test_construction_failure_leaves_slot_empty() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.fail_next_create(FsError::NoMemory);

    assert_eq!(mount.root_vnode().unwrap_err(), FsError::NoMemory);
    assert!(mount.root_snapshot().is_idle());

    // 下一次调用重新构造
    let root = mount.root_vnode().unwrap();
    assert_eq!(mount.root_snapshot().vnode, Some(root.vref()));
    assert_eq!(fx.cache.create_calls(), 2);
}

#[test]
fn test_add_fs_ref_failure_surfaces() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.fail_next_add_fs_ref(FsError::NoMemory);

    assert_eq!(mount.root_vnode().unwrap_err(), FsError::NoMemory);
    let snap = mount.root_snapshot();
    assert!(!snap.attaching && !snap.waiting);
    assert_eq!(snap.vnode, None);
    assert_eq!(snap.orphans, 1);

    let root = mount.root_vnode().unwrap();
    assert!(fx.cache.has_fs_ref(root.vref()));
    assert_eq!(fx.cache.create_calls(), 2);
}

#[test]
fn test_orphan_reclaim_keeps_current_root() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.fail_next_add_fs_ref(FsError::NoMemory);

    assert_eq!(mount.root_vnode().unwrap_err(), FsError::NoMemory);
    let root = mount.root_vnode().unwrap().vref();
    assert_eq!(fx.cache.live_count(mount.id()), 2);

    // 设备是 1 号，第一次构造出的孤儿是 2 号
    let orphan = VnodeRef::new(VnodeId(2), 1);
    assert_ne!(orphan, root);
    assert!(fx.cache.is_live(orphan));
    assert!(!fx.cache.has_fs_ref(orphan));

    fx.cache.evict(orphan).unwrap();
    let snap = mount.root_snapshot();
    assert_eq!(snap.vnode, Some(root));
    assert_eq!(snap.orphans, 0);
    assert!(fx.cache.has_fs_ref(root));

    let again = mount.root_vnode().unwrap();
    assert_eq!(again.vref(), root);
    assert_eq!(fx.cache.create_calls(), 2);
}

#[test]
fn test_unmount_reclaims_orphan_and_root() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.fail_next_add_fs_ref(FsError::NoMemory);

    assert!(mount.root_vnode().is_err());
    drop(mount.root_vnode().unwrap());

    vfs::FileSystem::unmount(&*mount, vfs::UnmountFlags::empty()).unwrap();
    assert!(mount.root_snapshot().is_idle());
    assert_eq!(fx.cache.live_count(mount.id()), 0);
    assert_eq!(fx.fs.mounted_count(), 0);
}

#[test]
fn test_eviction_then_recreate() {
    let fx = Fixture::new();
    let mount = fx.mount();

    let old = mount.root_vnode().unwrap().vref();
    fx.cache.evict(old).unwrap();
    assert!(!fx.cache.is_live(old));
    assert!(mount.root_snapshot().is_idle());

    let new = mount.root_vnode().unwrap();
    assert_ne!(new.vref(), old);
    assert_eq!(mount.root_snapshot().vnode, Some(new.vref()));
    assert_eq!(fx.cache.create_calls(), 2);
}

#[test]
fn test_evict_refused_while_held() {
    let fx = Fixture::new();
    let mount = fx.mount();

    let root = mount.root_vnode().unwrap();
    assert_eq!(fx.cache.evict(root.vref()), Err(FsError::Busy));
    assert_eq!(mount.root_snapshot().vnode, Some(root.vref()));
}

#[test]
fn test_stale_revalidation_retries() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap().vref();

    fx.cache.stale_next_get_with_vid(2);
    let again = mount.root_vnode().unwrap();
    assert_eq!(again.vref(), root);
    assert_eq!(fx.cache.get_with_vid_calls(), 3);
    assert_eq!(fx.cache.create_calls(), 1);
}

#[test]
fn test_detach_is_idempotent() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let root = mount.root_vnode().unwrap().vref();

    fx.cache.evict(root).unwrap();
    assert!(mount.root_snapshot().is_idle());

    // 迟到的重复通知
    mount.reclaim(root).unwrap();
    mount.reclaim(root).unwrap();
    assert!(mount.root_snapshot().is_idle());
}

#[test]
fn test_detach_during_attaching_is_noop() {
    let fx = Fixture::new();
    let mount = fx.mount();
    fx.cache.pause_create();

    let builder = {
        let mount = mount.clone();
        thread::spawn(move || mount.root_vnode().map(|vn| vn.vref()))
    };
    fx.cache.wait_create_entered(1);

    mount.reclaim(VnodeRef::new(VnodeId(999), 1)).unwrap();
    let snap = mount.root_snapshot();
    assert!(snap.attaching);
    assert_eq!(snap.vnode, None);

    fx.cache.resume_create();
    let root = builder.join().unwrap().unwrap();
    assert_eq!(mount.root_snapshot().vnode, Some(root));
}

#[test]
#[should_panic]
fn test_detach_foreign_vnode_panics() {
    let fx = Fixture::new();
    let mount = fx.mount();
    let _root = mount.root_vnode().unwrap();

    mount.reclaim(VnodeRef::new(VnodeId(12345), 1)).unwrap();
}

#[test]
fn test_get_races_with_eviction() {
    const ROUNDS: usize = 300;

    let fx = Fixture::new();
    let mount = fx.mount();

    let getters: Vec<_> = (0..4)
        .map(|_| {
            let mount = mount.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    // 持有 iocount 期间根不会被回收，槽里必然还是它
                    let vn = mount.root_vnode().unwrap();
                    assert_eq!(mount.root_snapshot().vnode, Some(vn.vref()));
                }
            })
        })
        .collect();

    let evictor = {
        let mount = mount.clone();
        let cache = fx.cache.clone();
        thread::spawn(move || {
            for _ in 0..ROUNDS {
                if let Some(vn) = mount.root_snapshot().vnode {
                    // 正在使用或已被别的线程回收都是正常情况
                    let _ = cache.evict(vn);
                }
                thread::yield_now();
            }
        })
    };

    for h in getters {
        h.join().unwrap();
    }
    evictor.join().unwrap();

    let root = mount.root_vnode().unwrap();
    assert!(fx.cache.is_live(root.vref()));
    assert!(fx.cache.has_fs_ref(root.vref()));
    assert_eq!(mount.root_snapshot().vnode, Some(root.vref()));
    assert_eq!(fx.cache.live_count(mount.id()), 1);
}
