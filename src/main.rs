fn main() {
    postsearch_lib::run()
}
