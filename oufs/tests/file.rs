mod common;

use common::{drain_blocks, formatted, pattern};
use oufs::{BLOCK_DATA_SIZE, BitFlags, BlockId, Error, MAX_FILE_SIZE, OpenMode, Resource};

#[test]
fn bleed_write_spans_two_blocks() {
    let (disk, fs) = formatted();
    fs.make_directory("/", "/a").unwrap();
    let file = fs.create_file("/", "/a/b").unwrap();

    let data = pattern(300);
    let mut handle = fs.open("/", "/a/b", OpenMode::Append).unwrap();
    assert_eq!(handle.write(&fs, &data), Ok(300));
    assert_eq!(handle.offset(), 44);

    let inode = fs.read_inode(file).unwrap();
    assert_eq!(inode.size, 300);
    let blocks: Vec<BlockId> = inode.data_blocks().collect();
    assert_eq!(blocks.len(), 2);

    let second = disk.block(blocks[1]);
    assert_eq!(&second[..44], &data[256..]);
    assert!(second[44..].iter().all(|&b| b == 0));
    assert_eq!(&disk.block(blocks[0])[..], &data[..256]);

    assert_eq!(fs.read_to_end(file).unwrap(), data);
}

#[test]
fn first_write_allocates_lazily() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 0);

    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    assert_eq!(handle.write(&fs, &[]), Ok(0));
    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 0);

    handle.write(&fs, b"hello").unwrap();
    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 1);
    assert_eq!(handle.offset(), 5);
}

#[test]
fn exact_boundary_defers_allocation() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    let data = pattern(BLOCK_DATA_SIZE + 1);

    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    handle.write(&fs, &data[..100]).unwrap();
    handle.write(&fs, &data[100..BLOCK_DATA_SIZE]).unwrap();
    assert_eq!(handle.offset(), BLOCK_DATA_SIZE);
    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 1);

    handle.write(&fs, &data[BLOCK_DATA_SIZE..]).unwrap();
    assert_eq!(handle.offset(), 1);
    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 2);
    assert_eq!(fs.read_to_end(file).unwrap(), data);
}

#[test]
fn appends_across_reopens() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/log").unwrap();
    let data = pattern(1000);

    let mut start = 0;
    for len in [7, 250, 1, 256, 300, 186] {
        let mut handle = fs.open("/", "/log", OpenMode::Append).unwrap();
        assert_eq!(handle.write(&fs, &data[start..start + len]), Ok(len));
        start += len;
    }

    let inode = fs.read_inode(file).unwrap();
    assert_eq!(inode.size, 1000);
    assert_eq!(inode.data_blocks().count(), 4);
    assert_eq!(fs.read_to_end(file).unwrap(), data);
}

#[test]
fn stale_handle_follows_size() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();

    let mut first = fs.open("/", "/f", OpenMode::Append).unwrap();
    let mut second = fs.open("/", "/f", OpenMode::Append).unwrap();
    first.write(&fs, b"abc").unwrap();
    second.write(&fs, b"def").unwrap();

    assert_eq!(fs.read_to_end(file).unwrap(), b"abcdef");
}

#[test]
fn write_larger_than_a_block() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/big").unwrap();
    let data = pattern(BLOCK_DATA_SIZE * 3 + 17);

    let mut handle = fs.open("/", "/big", OpenMode::Append).unwrap();
    handle.write(&fs, &data[..10]).unwrap();
    assert_eq!(handle.write(&fs, &data[10..]), Ok(data.len() - 10));

    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 4);
    assert_eq!(handle.offset(), 17);
    assert_eq!(fs.read_to_end(file).unwrap(), data);
}

#[test]
fn fill_to_capacity() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/full").unwrap();
    let data = pattern(MAX_FILE_SIZE);

    let mut handle = fs.open("/", "/full", OpenMode::Append).unwrap();
    assert_eq!(handle.write(&fs, &data), Ok(MAX_FILE_SIZE));

    let inode = fs.read_inode(file).unwrap();
    assert_eq!(inode.data_blocks().count(), 15);
    assert_eq!(fs.read_to_end(file).unwrap(), data);
}

#[test]
fn too_large_leaves_content() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    let data = pattern(MAX_FILE_SIZE - 10);

    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    handle.write(&fs, &data).unwrap();
    let before = fs.read_inode(file).unwrap();

    assert_eq!(handle.write(&fs, &[0; 11]), Err(Error::FileTooLarge));
    assert_eq!(fs.read_inode(file).unwrap(), before);
    assert_eq!(fs.read_to_end(file).unwrap(), data);

    // 剩下的空间仍然可用
    assert_eq!(handle.write(&fs, &[9; 10]), Ok(10));
    assert_eq!(handle.write(&fs, &[9]), Err(Error::FileTooLarge));
}

#[test]
fn too_large_from_empty_allocates_nothing() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();

    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    assert_eq!(
        handle.write(&fs, &pattern(MAX_FILE_SIZE + 1)),
        Err(Error::FileTooLarge)
    );
    assert_eq!(fs.read_inode(file).unwrap().data_blocks().count(), 0);
    assert_eq!(fs.alloc_block().unwrap(), BlockId::new(10));
}

#[test]
fn read_at_offsets() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    let data = pattern(600);
    fs.open("/", "/f", OpenMode::Append)
        .unwrap()
        .write(&fs, &data)
        .unwrap();

    let mut buf = [0; 100];
    assert_eq!(fs.read_at(file, 200, &mut buf), Ok(100));
    assert_eq!(&buf[..], &data[200..300]);

    assert_eq!(fs.read_at(file, 550, &mut buf), Ok(50));
    assert_eq!(&buf[..50], &data[550..]);

    assert_eq!(fs.read_at(file, 600, &mut buf), Ok(0));
    assert_eq!(fs.read_at(file, 9999, &mut buf), Ok(0));
    assert_eq!(fs.read_at(file, usize::MAX, &mut buf), Ok(0));
    assert_eq!(fs.read_at(file, 599, &mut buf), Ok(1));
    assert_eq!(buf[0], data[599]);
}

#[test]
fn access_modes() {
    let (_, fs) = formatted();
    fs.create_file("/", "/f").unwrap();

    let mut reader = fs.open("/", "/f", OpenMode::Read).unwrap();
    assert_eq!(reader.write(&fs, b"x"), Err(Error::BadAccess));

    let writer = fs.open("/", "/f", OpenMode::Append).unwrap();
    assert_eq!(writer.read_to_end(&fs), Err(Error::BadAccess));

    assert_eq!(OpenMode::parse("a"), Some(BitFlags::from(OpenMode::Append)));
    assert_eq!(OpenMode::parse("w"), Some(OpenMode::Write | OpenMode::Truncate));
    assert_eq!(OpenMode::parse("x"), None);
}

#[test]
fn truncate_on_open() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    fs.open("/", "/f", OpenMode::Append)
        .unwrap()
        .write(&fs, &pattern(400))
        .unwrap();
    let blocks: Vec<BlockId> = fs.read_inode(file).unwrap().data_blocks().collect();

    let mut handle = fs.open("/", "/f", OpenMode::parse("w").unwrap()).unwrap();
    assert_eq!(handle.offset(), 0);
    for block in blocks {
        assert!(!fs.is_block_allocated(block).unwrap());
    }

    handle.write(&fs, b"fresh").unwrap();
    assert_eq!(fs.read_to_end(file).unwrap(), b"fresh");
}

#[test]
fn missing_file_handle() {
    let (_, fs) = formatted();

    let mut handle = fs.open("/", "/nope", OpenMode::Append).unwrap();
    assert!(!handle.exists());
    assert_eq!(handle.write(&fs, b"x"), Err(Error::PathNotFound));

    // 父目录不存在同样只是“不存在”
    assert!(!fs.open("/", "/no/such/file", OpenMode::Read).unwrap().exists());
}

#[test]
fn directories_are_not_files() {
    let (_, fs) = formatted();
    fs.make_directory("/", "/d").unwrap();

    assert_eq!(fs.open("/", "/d", OpenMode::Read).err(), Some(Error::IsADirectory));
}

#[test]
fn bleed_write_without_blocks() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    let data = pattern(200);

    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    handle.write(&fs, &data).unwrap();
    let before = fs.read_inode(file).unwrap();
    drain_blocks(&fs);

    assert_eq!(
        handle.write(&fs, &[7; 100]),
        Err(Error::Exhausted(Resource::Block))
    );
    assert_eq!(fs.read_inode(file).unwrap(), before);
    assert_eq!(fs.read_to_end(file).unwrap(), data);

    // 活动块内还放得下的写入不需要新块
    assert_eq!(handle.write(&fs, &[7; 56]), Ok(56));
    assert_eq!(fs.read_inode(file).unwrap().size, 256);
}

#[test]
fn first_write_without_blocks() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();
    drain_blocks(&fs);

    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    assert_eq!(
        handle.write(&fs, b"x"),
        Err(Error::Exhausted(Resource::Block))
    );

    let inode = fs.read_inode(file).unwrap();
    assert_eq!(inode.size, 0);
    assert_eq!(inode.data_blocks().count(), 0);
}

#[test]
fn exhausted_mid_write_keeps_finished_blocks() {
    let (_, fs) = formatted();
    let file = fs.create_file("/", "/f").unwrap();

    // 只留两个空闲块
    let mut drained = drain_blocks(&fs);
    for block in drained.split_off(drained.len() - 2) {
        fs.free_block(block).unwrap();
    }

    let data = pattern(600);
    let mut handle = fs.open("/", "/f", OpenMode::Append).unwrap();
    assert_eq!(
        handle.write(&fs, &data),
        Err(Error::Exhausted(Resource::Block))
    );

    let inode = fs.read_inode(file).unwrap();
    assert_eq!(inode.size as usize, 2 * BLOCK_DATA_SIZE);
    assert_eq!(inode.data_blocks().count(), 2);
    assert_eq!(fs.read_to_end(file).unwrap(), &data[..2 * BLOCK_DATA_SIZE]);
}
